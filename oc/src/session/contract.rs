//! Structured-output contract between the session and the model
//!
//! Every model turn must decode into a JSON object with exactly these keys:
//!
//! - `current_estimation`: array of 24 numbers in [0, 1]
//! - `following_question`: string, or null when no further questions are needed
//! - `validation_check`: string
//!
//! A decode failure and a missing key are deliberately the same error kind:
//! both mean the model did not honor the contract.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::Turn;
use crate::estimate::OccupancyEstimate;

/// The model response did not honor the output contract
#[derive(Debug, Error, Clone, PartialEq)]
#[error("model response violated the output contract: {reason}")]
pub struct ContractViolation {
    pub reason: String,
}

impl ContractViolation {
    fn new(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        debug!(%reason, "ContractViolation::new: called");
        Self { reason }
    }
}

/// Decode one model response into a validated [`Turn`]
///
/// On the opening turn the model is asked for a question only, so an absent
/// or null `current_estimation` and `validation_check` are tolerated there.
/// A `current_estimation` that is present must validate on every turn.
pub(crate) fn parse_reply(text: &str, opening: bool) -> Result<Turn, ContractViolation> {
    debug!(text_len = %text.len(), %opening, "parse_reply: called");
    let json = extract_json(text);

    let value: Value =
        serde_json::from_str(json).map_err(|e| ContractViolation::new(format!("response is not valid JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| ContractViolation::new("response is not a JSON object"))?;

    if !opening {
        for key in ["current_estimation", "following_question", "validation_check"] {
            if !object.contains_key(key) {
                debug!(%key, "parse_reply: missing key");
                return Err(ContractViolation::new(format!("missing required key '{key}'")));
            }
        }
    } else if !object.contains_key("following_question") {
        debug!("parse_reply: opening turn missing following_question");
        return Err(ContractViolation::new("missing required key 'following_question'"));
    }

    let estimate = parse_estimation(object.get("current_estimation"), opening)?;
    let follow_up_question = parse_question(object.get("following_question"))?;
    let rationale = parse_rationale(object.get("validation_check"), opening)?;

    Ok(Turn {
        estimate,
        follow_up_question,
        rationale,
    })
}

/// Coerce `current_estimation` into a validated 24-hour estimate
fn parse_estimation(value: Option<&Value>, opening: bool) -> Result<Option<OccupancyEstimate>, ContractViolation> {
    debug!(present = %value.is_some(), %opening, "parse_estimation: called");
    let value = match value {
        None | Some(Value::Null) if opening => return Ok(None),
        None | Some(Value::Null) => {
            return Err(ContractViolation::new("'current_estimation' must be an array of numbers"));
        }
        Some(v) => v,
    };

    let array = value
        .as_array()
        .ok_or_else(|| ContractViolation::new("'current_estimation' must be an array of numbers"))?;

    let mut values = Vec::with_capacity(array.len());
    for item in array {
        let number = item
            .as_f64()
            .ok_or_else(|| ContractViolation::new(format!("'current_estimation' contains a non-number: {item}")))?;
        values.push(number);
    }

    let estimate = OccupancyEstimate::new(values)
        .map_err(|e| ContractViolation::new(format!("'current_estimation' is invalid: {e}")))?;

    Ok(Some(estimate))
}

/// Coerce `following_question` into an optional question string
fn parse_question(value: Option<&Value>) -> Result<Option<String>, ContractViolation> {
    debug!(present = %value.is_some(), "parse_question: called");
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ContractViolation::new(format!(
            "'following_question' must be a string or null, got {other}"
        ))),
    }
}

/// Coerce `validation_check` into the turn rationale
fn parse_rationale(value: Option<&Value>, opening: bool) -> Result<String, ContractViolation> {
    debug!(present = %value.is_some(), %opening, "parse_rationale: called");
    match value {
        None | Some(Value::Null) if opening => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        None | Some(Value::Null) => Err(ContractViolation::new("'validation_check' must be a string")),
        Some(other) => Err(ContractViolation::new(format!(
            "'validation_check' must be a string, got {other}"
        ))),
    }
}

/// Strip a surrounding markdown code fence, if any
///
/// Models frequently wrap the JSON object in a ```json fence or lead with
/// prose; the contract cares about the object itself.
fn extract_json(text: &str) -> &str {
    debug!(text_len = %text.len(), "extract_json: called");
    let trimmed = text.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        // Drop the fence language tag line, then everything after the closing fence
        let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
        let body = body.rsplit_once("```").map(|(b, _)| b).unwrap_or(body);
        return body.trim();
    }

    // Prose around a bare object: take the outermost brace span
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
    {
        return &trimmed[start..=end];
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICE_VECTOR: &str = "[0, 0, 0, 0, 0, 0, 0, 0.8, 1, 1, 1, 1, 1, 1, 1, 0.8, 0, 0, 0, 0, 0, 0, 0, 0]";

    fn reply(question: &str) -> String {
        format!(
            r#"{{"current_estimation": {OFFICE_VECTOR}, "following_question": {question}, "validation_check": "matches office pattern"}}"#
        )
    }

    #[test]
    fn test_well_formed_reply() {
        let turn = parse_reply(&reply("\"What are the weekend hours?\""), false).unwrap();

        let estimate = turn.estimate.unwrap();
        assert_eq!(estimate.values()[8], 1.0);
        assert_eq!(estimate.values()[0], 0.0);
        assert_eq!(turn.follow_up_question.as_deref(), Some("What are the weekend hours?"));
        assert_eq!(turn.rationale, "matches office pattern");
    }

    #[test]
    fn test_null_question_signals_termination() {
        let turn = parse_reply(&reply("null"), false).unwrap();
        assert!(turn.follow_up_question.is_none());
        assert!(turn.estimate.is_some());
    }

    #[test]
    fn test_fenced_reply_accepted() {
        let fenced = format!("```json\n{}\n```", reply("null"));
        let turn = parse_reply(&fenced, false).unwrap();
        assert!(turn.estimate.is_some());
    }

    #[test]
    fn test_prose_around_object_accepted() {
        let wrapped = format!("Here is my estimation:\n{}\nLet me know!", reply("null"));
        let turn = parse_reply(&wrapped, false).unwrap();
        assert!(turn.estimate.is_some());
    }

    #[test]
    fn test_missing_key_rejected() {
        let text = format!(r#"{{"current_estimation": {OFFICE_VECTOR}, "following_question": null}}"#);
        let err = parse_reply(&text, false).unwrap_err();
        assert!(err.reason.contains("validation_check"));
    }

    #[test]
    fn test_not_json_rejected() {
        let err = parse_reply("I think the building is mostly empty at night.", false).unwrap_err();
        assert!(err.reason.contains("not valid JSON"));
    }

    #[test]
    fn test_wrong_length_estimation_rejected() {
        let text = r#"{"current_estimation": [0, 1, 0], "following_question": null, "validation_check": "short"}"#;
        let err = parse_reply(text, false).unwrap_err();
        assert!(err.reason.contains("current_estimation"));
    }

    #[test]
    fn test_out_of_range_estimation_rejected() {
        let mut values = vec!["0.5"; 24];
        values[5] = "1.5";
        let text = format!(
            r#"{{"current_estimation": [{}], "following_question": null, "validation_check": "bad"}}"#,
            values.join(", ")
        );
        let err = parse_reply(&text, false).unwrap_err();
        assert!(err.reason.contains("current_estimation"));
    }

    #[test]
    fn test_null_estimation_rejected_on_refinement() {
        let text = r#"{"current_estimation": null, "following_question": "More?", "validation_check": "none yet"}"#;
        assert!(parse_reply(text, false).is_err());
    }

    #[test]
    fn test_opening_turn_without_estimation() {
        let text = r#"{"following_question": "What are the typical hours of operation or occupancy?"}"#;
        let turn = parse_reply(text, true).unwrap();
        assert!(turn.estimate.is_none());
        assert!(turn.follow_up_question.is_some());
        assert_eq!(turn.rationale, "");
    }

    #[test]
    fn test_opening_turn_with_estimation_still_validated() {
        let text = r#"{"following_question": "Hours?", "current_estimation": [2, 0, 0]}"#;
        assert!(parse_reply(text, true).is_err());
    }

    #[test]
    fn test_empty_question_string_treated_as_termination() {
        let turn = parse_reply(&reply("\"  \""), false).unwrap();
        assert!(turn.follow_up_question.is_none());
    }
}
