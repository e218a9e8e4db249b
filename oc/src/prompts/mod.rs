//! Prompt construction for the estimation session
//!
//! Prompts are fixed data: an embedded instruction preamble plus plain string
//! concatenation for the building description. No template engine.

use tracing::debug;

mod embedded;

pub use embedded::{ESTIMATE_SYSTEM, OPENING_INSTRUCTION};

/// Build the system prompt for one estimation session
///
/// The same preamble seeds every model invocation of the session; only the
/// building description varies between sessions.
pub fn system_prompt(building_info: &str) -> String {
    debug!(info_len = %building_info.len(), "system_prompt: called");
    format!("{}\nbuilding information: {}\n", ESTIMATE_SYSTEM, building_info.trim())
}
