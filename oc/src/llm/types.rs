//! LLM request/response types for OccuSched
//!
//! These types model a chat-completion exchange but are provider-agnostic:
//! the same request shape is sent to Ollama's chat API and Anthropic's
//! Messages API.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A completion request - everything needed for one LLM call
///
/// The system prompt carries the fixed instruction preamble (task statement,
/// output contract, worked examples); the messages carry the transcript.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (fixed instruction preamble)
    pub system_prompt: String,

    /// Conversation so far, oldest first
    pub messages: Vec<Message>,

    /// Max tokens for response (from config)
    pub max_tokens: u32,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        debug!("Message::user: called");
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        debug!("Message::assistant: called");
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content; None when the provider returned an empty turn
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Wrap response text, mapping empty/whitespace output to None
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        debug!(text_len = %text.len(), "CompletionResponse::from_text: called");
        if text.trim().is_empty() {
            Self { content: None }
        } else {
            Self { content: Some(text) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_user() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
    }

    #[test]
    fn test_message_assistant() {
        let msg = Message::assistant("Hi there");
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "Hi there");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }

    #[test]
    fn test_response_from_text() {
        let response = CompletionResponse::from_text("some content");
        assert_eq!(response.content.as_deref(), Some("some content"));
    }

    #[test]
    fn test_response_from_empty_text() {
        assert!(CompletionResponse::from_text("").content.is_none());
        assert!(CompletionResponse::from_text("   \n").content.is_none());
    }
}
