//! OccuSched - User-Assisted Occupancy Schedule Estimation
//!
//! CLI entry point: wires the estimation session to the terminal and the
//! schedule committer to the filesystem. The core never touches files or
//! stdin itself.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

use occusched::cli::{Cli, Command, default_output, parse_values};
use occusched::config::Config;
use occusched::idf::{ScheduleDocument, commit};
use occusched::llm::{LlmClient, create_client};
use occusched::session::{EstimationSession, SessionError, Turn};

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("occusched")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Setup tracing subscriber - write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("occusched.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref())?;
    config.validate()?;

    match cli.command {
        Command::Estimate {
            idf,
            schedule,
            building,
            output,
        } => {
            let llm = create_client(&config.llm)?;
            let estimate = run_estimation(llm, &config, building).await?;
            write_schedule(&idf, &schedule, &estimate, output)?;
        }
        Command::Apply {
            idf,
            schedule,
            values,
            output,
        } => {
            let values = parse_values(&values)?;
            write_schedule(&idf, &schedule, &values, output)?;
        }
    }

    Ok(())
}

/// Drive the interactive estimation dialogue to a finalized estimate
async fn run_estimation(llm: Arc<dyn LlmClient>, config: &Config, building: Option<String>) -> Result<Vec<f64>> {
    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

    print_welcome();

    let description = match building {
        Some(text) => text,
        None => rl
            .readline(&format!("{} ", "Describe the building:".bright_cyan()))
            .context("Failed to read building description")?,
    };

    let mut session = EstimationSession::new(llm.clone(), config.session.clone());
    let turn = session.start(&description).await?;
    print_turn(&turn);

    while !session.is_complete() {
        let readline = rl.readline(&format!("{} ", ">".bright_green()));

        match readline {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(input);

                match input {
                    "done" => {
                        session.finish();
                        break;
                    }
                    "clear" => {
                        println!("{}", "Session cleared, starting over.".dimmed());
                        session = EstimationSession::new(llm.clone(), config.session.clone());
                        let turn = session.start(&description).await?;
                        print_turn(&turn);
                    }
                    _ => {
                        let turn = session.respond(input).await?;
                        print_turn(&turn);
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C - just show new prompt
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - finish with whatever we have
                println!();
                session.finish();
                break;
            }
            Err(err) => {
                return Err(eyre::eyre!("Readline error: {}", err));
            }
        }
    }

    match session.finalize() {
        Ok(estimate) => {
            println!("{}", "Refinement complete.".bright_cyan());
            Ok(estimate.into_values())
        }
        Err(SessionError::NoEstimateAvailable) => {
            Err(eyre::eyre!("The session ended without producing a valid estimate"))
        }
        Err(e) => Err(e).context("Failed to finalize the session"),
    }
}

/// Load, update and save the target IDF file
fn write_schedule(idf: &PathBuf, schedule: &str, values: &[f64], output: Option<PathBuf>) -> Result<()> {
    let source = fs::read_to_string(idf).with_context(|| format!("Failed to read {}", idf.display()))?;
    let document = ScheduleDocument::parse(&source).with_context(|| format!("Failed to parse {}", idf.display()))?;

    let updated = commit(document, schedule, values)?;

    let output = output.unwrap_or_else(|| default_output(idf));
    fs::write(&output, updated.render()).with_context(|| format!("Failed to write {}", output.display()))?;

    info!(schedule, output = %output.display(), "schedule committed");
    println!(
        "{} schedule {} written to {}",
        "Updated".bright_green(),
        schedule.yellow(),
        output.display()
    );
    Ok(())
}

/// Print welcome message
fn print_welcome() {
    println!();
    println!("{}", "OccuSched - occupancy schedule estimation".bright_cyan().bold());
    println!(
        "Answer the model's questions; type {} to finish early, {} to restart",
        "done".yellow(),
        "clear".yellow()
    );
    println!();
}

/// Print one turn of the dialogue
fn print_turn(turn: &Turn) {
    if let Some(estimate) = &turn.estimate {
        let rendered: Vec<String> = estimate.values().iter().map(|v| format!("{}", v)).collect();
        println!("{} [{}]", "Current estimation:".bright_blue(), rendered.join(", "));
    }
    if !turn.rationale.is_empty() {
        println!("{} {}", "Validation:".dimmed(), turn.rationale.dimmed());
    }
    match &turn.follow_up_question {
        Some(question) => println!("{} {}", "?".bright_yellow(), question),
        None => println!("{}", "No further questions.".dimmed()),
    }
}
