//! OccuSched - User-Assisted Occupancy Schedule Estimation
//!
//! OccuSched estimates a building's 24-hour occupancy schedule through an
//! iterative dialogue between a human operator and a language model, then
//! commits the finalized estimate into an EnergyPlus IDF schedule block.
//!
//! # Core Concepts
//!
//! - **Structured Contract Always**: Every model turn must decode into the
//!   fixed three-key JSON contract; one bad parse ends refinement
//! - **Append-Only Transcript**: The session owns its conversation state;
//!   nothing is shared or mutated out from under it
//! - **Strict Commit**: The committer re-validates the estimate and rewrites
//!   exactly one schedule block, leaving every other byte of the document alone
//!
//! # Modules
//!
//! - [`estimate`] - The validated 24-hour occupancy vector
//! - [`llm`] - LLM client trait and Ollama/Anthropic implementations
//! - [`prompts`] - Embedded instruction set and output contract
//! - [`session`] - The turn-by-turn estimation state machine
//! - [`idf`] - IDF document model and schedule committer
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod estimate;
pub mod idf;
pub mod llm;
pub mod prompts;
pub mod session;

// Re-export commonly used types
pub use config::{Config, LlmConfig, SessionConfig};
pub use estimate::{EstimateError, OccupancyEstimate};
pub use idf::{CommitError, IdfError, IdfObject, ScheduleDocument, commit};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, OllamaClient, Role,
    create_client,
};
pub use session::{ContractViolation, EstimationSession, SessionError, Turn};
