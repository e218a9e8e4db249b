//! Integration tests for OccuSched
//!
//! These tests drive the full estimate-then-commit pipeline against a
//! scripted mock backend.

use std::sync::Arc;

use occusched::config::SessionConfig;
use occusched::estimate::OccupancyEstimate;
use occusched::idf::{CommitError, ScheduleDocument, commit};
use occusched::llm::client::mock::MockLlmClient;
use occusched::session::{EstimationSession, SessionError};

// =============================================================================
// Fixtures
// =============================================================================

const OPENING_REPLY: &str = r#"{
    "current_estimation": null,
    "following_question": "What are the typical hours of operation or occupancy?",
    "validation_check": ""
}"#;

const OFFICE_REPLY: &str = r#"{
    "current_estimation": [0, 0, 0, 0, 0, 0, 0, 0.8, 1, 1, 1, 1, 1, 1, 1, 0.8, 0, 0, 0, 0, 0, 0, 0, 0],
    "following_question": null,
    "validation_check": "matches office pattern"
}"#;

const OFFICE_VECTOR: [f64; 24] = [
    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.8, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.8, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0,
];

const IDF_SOURCE: &str = "\
! Medium office model, occupancy schedule block plus unrelated objects
Version,
    9.4;

Schedule:Compact,
    BLDG_OCC_SCH,
    Fraction,
    Through: 12/31,
    For: AllDays,
    Until: 24:00,
    0.5;

ZoneInfiltration:DesignFlowRate,
    Infil 1,
    Perimeter_ZN_1,
    BLDG_OCC_SCH,
    Flow/Zone,
    0.01;
";

fn session_with(texts: Vec<&str>) -> EstimationSession {
    EstimationSession::new(Arc::new(MockLlmClient::with_texts(texts)), SessionConfig::default())
}

// =============================================================================
// Estimation Session Tests
// =============================================================================

#[tokio::test]
async fn test_office_scenario_end_to_end() {
    let mut session = session_with(vec![OPENING_REPLY, OFFICE_REPLY]);

    // start returns a Turn with a non-null follow-up question
    let opening = session
        .start("Office building, built 2011, education use")
        .await
        .expect("start should succeed");
    assert!(opening.follow_up_question.is_some());
    assert!(!session.is_complete());

    // the stub reply terminates the dialogue with the exact office vector
    let turn = session
        .respond("Open 9am-5pm weekdays")
        .await
        .expect("respond should succeed");
    assert!(turn.follow_up_question.is_none());
    assert!(session.is_complete());

    let estimate = session.finalize().expect("finalize should succeed");
    assert_eq!(estimate.values(), OFFICE_VECTOR.as_slice());
}

#[tokio::test]
async fn test_contract_violation_ends_in_degraded_turn() {
    let mut session = session_with(vec![OPENING_REPLY, "sure! the building is probably full at noon"]);

    session.start("Office building").await.unwrap();
    let turn = session.respond("Open 9-5").await.unwrap();

    // Degraded fallback: no estimate, no question, explanatory rationale
    assert!(turn.estimate.is_none());
    assert!(turn.follow_up_question.is_none());
    assert!(!turn.rationale.is_empty());
    assert!(session.is_complete());

    assert!(matches!(session.finalize(), Err(SessionError::NoEstimateAvailable)));
}

#[tokio::test]
async fn test_missing_key_is_a_contract_violation() {
    let missing_check = r#"{
        "current_estimation": [0, 0, 0, 0, 0, 0, 0, 0.8, 1, 1, 1, 1, 1, 1, 1, 0.8, 0, 0, 0, 0, 0, 0, 0, 0],
        "following_question": null
    }"#;
    let mut session = session_with(vec![OPENING_REPLY, missing_check]);

    session.start("Office building").await.unwrap();
    let turn = session.respond("Open 9-5").await.unwrap();

    assert!(turn.estimate.is_none());
    assert!(turn.follow_up_question.is_none());
}

#[tokio::test]
async fn test_respond_before_start_is_protocol_violation() {
    let mut session = session_with(vec![]);
    let err = session.respond("hello").await.unwrap_err();
    assert!(matches!(err, SessionError::ProtocolViolation(_)));
}

// =============================================================================
// Committer Tests
// =============================================================================

#[test]
fn test_commit_zero_vector_scenario() {
    let document = ScheduleDocument::parse(IDF_SOURCE).unwrap();
    let updated = commit(document, "BLDG_OCC_SCH", &[0.0; 24]).unwrap();

    let block = updated
        .objects()
        .find(|o| o.name() == Some("BLDG_OCC_SCH"))
        .expect("schedule block present");

    // all 24 time slots are 01:00..24:00 in order, all value slots are 0
    for hour in 0..24 {
        assert_eq!(block.fields[4 + 2 * hour], format!("{:02}:00", hour + 1));
        assert_eq!(block.fields[5 + 2 * hour].parse::<f64>().unwrap(), 0.0);
    }
}

#[test]
fn test_commit_preserves_every_other_block() {
    let document = ScheduleDocument::parse(IDF_SOURCE).unwrap();
    let rendered = commit(document, "BLDG_OCC_SCH", &OFFICE_VECTOR).unwrap().render();

    assert!(rendered.starts_with("! Medium office model, occupancy schedule block plus unrelated objects\n"));
    assert!(rendered.contains("Version,\n    9.4;\n"));
    // the infiltration object referencing the schedule by name is untouched
    assert!(rendered.contains(
        "ZoneInfiltration:DesignFlowRate,\n    Infil 1,\n    Perimeter_ZN_1,\n    BLDG_OCC_SCH,\n    Flow/Zone,\n    0.01;"
    ));
}

#[test]
fn test_commit_unknown_block_leaves_document_unmodified() {
    let document = ScheduleDocument::parse(IDF_SOURCE).unwrap();
    let before = document.render();

    let err = commit(document.clone(), "NOT_A_SCHEDULE", &OFFICE_VECTOR).unwrap_err();

    assert!(matches!(err, CommitError::BlockNotFound(_)));
    assert_eq!(document.render(), before);
}

#[test]
fn test_commit_rejects_invalid_vectors() {
    let document = ScheduleDocument::parse(IDF_SOURCE).unwrap();

    let err = commit(document.clone(), "BLDG_OCC_SCH", &[0.5; 12]).unwrap_err();
    assert!(matches!(err, CommitError::InvalidEstimate(_)));

    let mut values = [0.5; 24];
    values[3] = -0.5;
    let err = commit(document, "BLDG_OCC_SCH", &values).unwrap_err();
    assert!(matches!(err, CommitError::InvalidEstimate(_)));
}

// =============================================================================
// Full Pipeline Tests
// =============================================================================

#[tokio::test]
async fn test_estimate_then_commit_pipeline() {
    let mut session = session_with(vec![OPENING_REPLY, OFFICE_REPLY]);
    session.start("Office building, built 2011, education use").await.unwrap();
    session.respond("Open 9am-5pm weekdays").await.unwrap();
    let estimate = session.finalize().unwrap();

    let document = ScheduleDocument::parse(IDF_SOURCE).unwrap();
    let updated = commit(document, "BLDG_OCC_SCH", estimate.values()).unwrap();

    // Write through a temp file the way the CLI does, and check the
    // committed values survive a reparse
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("office_updated.idf");
    std::fs::write(&path, updated.render()).unwrap();

    let reparsed = ScheduleDocument::parse(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let block = reparsed.objects().find(|o| o.name() == Some("BLDG_OCC_SCH")).unwrap();

    let expected = OccupancyEstimate::new(OFFICE_VECTOR.to_vec()).unwrap();
    for (hour, value) in expected.values().iter().enumerate() {
        assert_eq!(block.fields[5 + 2 * hour].parse::<f64>().unwrap(), *value);
    }
}
