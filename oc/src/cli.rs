//! CLI command definitions and subcommands

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// OccuSched - user-assisted occupancy schedule estimation
#[derive(Parser)]
#[command(
    name = "occusched",
    about = "Estimate a building's hourly occupancy schedule and write it into an IDF file",
    version,
    after_help = "Logs are written to: ~/.local/share/occusched/logs/occusched.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Estimate an occupancy schedule interactively and commit it
    Estimate {
        /// Path to the IDF file to update
        #[arg(value_name = "IDF")]
        idf: PathBuf,

        /// Name of the Schedule:Compact block to overwrite
        #[arg(short, long, default_value = "BLDG_OCC_SCH")]
        schedule: String,

        /// Building description (prompted for interactively when omitted)
        #[arg(short, long)]
        building: Option<String>,

        /// Where to write the updated IDF (default: <stem>_updated.idf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Commit 24 comma-separated hourly values without a dialogue
    Apply {
        /// Path to the IDF file to update
        #[arg(value_name = "IDF")]
        idf: PathBuf,

        /// Name of the Schedule:Compact block to overwrite
        #[arg(short, long, default_value = "BLDG_OCC_SCH")]
        schedule: String,

        /// 24 comma-separated hourly values in [0, 1]
        #[arg(value_name = "VALUES")]
        values: String,

        /// Where to write the updated IDF (default: <stem>_updated.idf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Default output path: sibling of the input with an `_updated` suffix
pub fn default_output(idf: &PathBuf) -> PathBuf {
    let stem = idf.file_stem().and_then(|s| s.to_str()).unwrap_or("schedule");
    idf.with_file_name(format!("{stem}_updated.idf"))
}

/// Parse a comma-separated hourly value list
pub fn parse_values(values: &str) -> eyre::Result<Vec<f64>> {
    values
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| eyre::eyre!("invalid hourly value '{}': {}", part.trim(), e))
        })
        .collect()
}
