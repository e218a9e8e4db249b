//! The turn-by-turn estimation session
//!
//! [`EstimationSession`] drives a bounded dialogue that converges on a
//! validated [`OccupancyEstimate`]. It owns the transcript (append-only),
//! invokes the LLM backend once per turn, and validates every response
//! against the structured-output contract. One failed parse ends refinement:
//! the session falls back to a degraded terminal turn instead of re-prompting.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

mod contract;

pub use contract::ContractViolation;

use crate::config::SessionConfig;
use crate::estimate::OccupancyEstimate;
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::prompts;

/// One exchange of the estimation dialogue
///
/// `follow_up_question` of None signals that the model needs nothing further.
/// A turn with no estimate and no question is the degraded fallback state;
/// its rationale carries the failure description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub estimate: Option<OccupancyEstimate>,
    pub follow_up_question: Option<String>,
    pub rationale: String,
}

impl Turn {
    /// Build the degraded fallback turn for a contract violation
    fn degraded(violation: &ContractViolation) -> Self {
        debug!("Turn::degraded: called");
        Self {
            estimate: None,
            follow_up_question: None,
            rationale: format!("An error occurred: {violation}"),
        }
    }
}

/// Errors surfaced by the estimation session
///
/// Contract violations are not an error variant: they terminate the session
/// through the degraded fallback [`Turn`], which is a first-class state.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend unreachable or returned no content - fatal to the current
    /// turn; the caller may retry or restart the session
    #[error("language model invocation failed: {0}")]
    InvocationFailure(#[from] LlmError),

    /// Caller broke the session protocol - a programming error
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// No turn ever produced a valid 24-hour estimate
    #[error("no valid estimate was produced by the session")]
    NoEstimateAvailable,
}

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Created, `start` not yet called
    Idle,
    /// A question is pending an operator reply
    Open,
    /// The model signalled no further questions, or the operator finished early
    Complete,
    /// A contract violation ended refinement
    Failed,
}

/// Turn-by-turn dialogue state machine
///
/// Strictly sequential: each `respond` call blocks on exactly one backend
/// invocation. The transcript is append-only and never shared.
pub struct EstimationSession {
    llm: Arc<dyn LlmClient>,
    config: SessionConfig,
    system_prompt: String,
    transcript: Vec<Message>,
    turns: Vec<Turn>,
    phase: Phase,
}

impl EstimationSession {
    /// Create a session over the given backend
    pub fn new(llm: Arc<dyn LlmClient>, config: SessionConfig) -> Self {
        debug!(max_turns = ?config.max_turns, "EstimationSession::new: called");
        Self {
            llm,
            config,
            system_prompt: String::new(),
            transcript: Vec::new(),
            turns: Vec::new(),
            phase: Phase::Idle,
        }
    }

    /// Seed the session with a building description and get the opening question
    ///
    /// Issues one model invocation that requests only an opening question; no
    /// estimate is required on this call.
    pub async fn start(&mut self, building_description: &str) -> Result<Turn, SessionError> {
        debug!(description_len = %building_description.len(), "start: called");
        if self.phase != Phase::Idle {
            debug!(?self.phase, "start: session already started");
            return Err(SessionError::ProtocolViolation("session already started".to_string()));
        }
        if building_description.trim().is_empty() {
            return Err(SessionError::ProtocolViolation(
                "building description must be non-empty".to_string(),
            ));
        }

        self.system_prompt = prompts::system_prompt(building_description);
        self.transcript.push(Message::user(prompts::OPENING_INSTRUCTION));

        let content = self.invoke().await?;

        match contract::parse_reply(&content, true) {
            Ok(turn) => {
                debug!(has_question = %turn.follow_up_question.is_some(), "start: opening turn accepted");
                self.transcript.push(Message::assistant(content));
                Ok(self.accept(turn))
            }
            Err(violation) => {
                warn!(%violation, "start: opening reply violated the contract");
                Ok(self.fail(violation))
            }
        }
    }

    /// Feed the operator's answer to the pending question back to the model
    ///
    /// On success the transcript gains the operator reply and the validated
    /// model reply. On a contract violation the transcript is left untouched
    /// and the degraded terminal turn is returned; refinement is over.
    pub async fn respond(&mut self, operator_reply: &str) -> Result<Turn, SessionError> {
        debug!(reply_len = %operator_reply.len(), "respond: called");
        if self.phase != Phase::Open {
            debug!(?self.phase, "respond: no question pending");
            return Err(SessionError::ProtocolViolation(
                "respond called with no question pending".to_string(),
            ));
        }
        if operator_reply.trim().is_empty() {
            return Err(SessionError::ProtocolViolation(
                "operator reply must be non-empty".to_string(),
            ));
        }

        // Stage the reply without committing it: a rejected model response
        // must leave the transcript unchanged.
        self.transcript.push(Message::user(operator_reply));
        let result = self.invoke().await;
        let reply = self.transcript.pop();

        let content = result?;

        match contract::parse_reply(&content, false) {
            Ok(turn) => {
                debug!(
                    has_estimate = %turn.estimate.is_some(),
                    has_question = %turn.follow_up_question.is_some(),
                    "respond: turn accepted"
                );
                if let Some(reply) = reply {
                    self.transcript.push(reply);
                }
                self.transcript.push(Message::assistant(content));
                Ok(self.accept(turn))
            }
            Err(violation) => {
                warn!(%violation, "respond: reply violated the contract, ending refinement");
                Ok(self.fail(violation))
            }
        }
    }

    /// True when the dialogue is over, by model signal, turn cap, early
    /// finish, or the degraded fallback path
    pub fn is_complete(&self) -> bool {
        debug!(?self.phase, "is_complete: called");
        matches!(self.phase, Phase::Complete | Phase::Failed)
    }

    /// End the dialogue early at the operator's request
    ///
    /// Clears any pending question; the last valid estimate (if any) remains
    /// available to `finalize`.
    pub fn finish(&mut self) {
        debug!(?self.phase, "finish: called");
        if self.phase == Phase::Open {
            self.phase = Phase::Complete;
        }
    }

    /// Return the last valid estimate of a completed session
    pub fn finalize(&self) -> Result<OccupancyEstimate, SessionError> {
        debug!(?self.phase, turn_count = %self.turns.len(), "finalize: called");
        if !self.is_complete() {
            return Err(SessionError::ProtocolViolation(
                "finalize called before the session completed".to_string(),
            ));
        }

        self.turns
            .iter()
            .rev()
            .find_map(|turn| turn.estimate.clone())
            .ok_or(SessionError::NoEstimateAvailable)
    }

    /// The question currently awaiting an operator reply
    pub fn pending_question(&self) -> Option<&str> {
        match self.phase {
            Phase::Open => self.turns.last().and_then(|t| t.follow_up_question.as_deref()),
            _ => None,
        }
    }

    /// All turns so far, oldest first
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// One backend round-trip over the transcript so far
    async fn invoke(&self) -> Result<String, SessionError> {
        debug!(transcript_len = %self.transcript.len(), "invoke: called");
        let request = CompletionRequest {
            system_prompt: self.system_prompt.clone(),
            messages: self.transcript.clone(),
            max_tokens: self.config.max_tokens,
        };

        let response = self.llm.complete(request).await?;

        response.content.ok_or_else(|| {
            debug!("invoke: backend returned no content");
            SessionError::InvocationFailure(LlmError::InvalidResponse(
                "model returned no content".to_string(),
            ))
        })
    }

    /// Record a validated turn and advance the phase
    ///
    /// Enforces the configured turn cap by clearing the pending question on
    /// the turn that hits it.
    fn accept(&mut self, mut turn: Turn) -> Turn {
        debug!(turn_count = %self.turns.len(), "accept: called");
        if let Some(cap) = self.config.max_turns
            && self.turns.len() as u32 + 1 >= cap
            && turn.follow_up_question.is_some()
        {
            warn!(%cap, "accept: turn cap reached, forcing completion");
            turn.follow_up_question = None;
        }

        self.phase = if turn.follow_up_question.is_some() {
            Phase::Open
        } else {
            Phase::Complete
        };
        self.turns.push(turn.clone());
        turn
    }

    /// Record the degraded fallback turn; the session is terminally failed
    fn fail(&mut self, violation: ContractViolation) -> Turn {
        debug!(%violation, "fail: called");
        let turn = Turn::degraded(&violation);
        self.phase = Phase::Failed;
        self.turns.push(turn.clone());
        turn
    }
}
