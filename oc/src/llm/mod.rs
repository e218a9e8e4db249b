//! LLM client module for OccuSched
//!
//! Provides the backend capability the estimation session needs: one
//! synchronous (from the core's viewpoint) completion round-trip.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod ollama;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use ollama::OllamaClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Supports "ollama" and "anthropic" providers.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "ollama" => {
            debug!("create_client: creating Ollama client");
            Ok(Arc::new(OllamaClient::from_config(config)?))
        }
        "anthropic" => {
            debug!("create_client: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: ollama, anthropic",
                other
            )))
        }
    }
}
