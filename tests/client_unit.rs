//! Pure unit tests for the CodeQuest wire contract.
//!
//! These exercise serialization rules and grading-display logic that must
//! hold no matter what the UI does:
//! - assignment bodies carry JSON `null` for "remove from group"
//! - `{"error": ...}` envelopes are recognized regardless of HTTP status
//! - verdict thresholds match the server's score bands
//!
//! Because the main crate is a binary with GPU and windowing dependencies
//! that may not be available in all CI environments, these tests define the
//! minimal types inline rather than importing from the crate. The types
//! mirror the real implementations in `src/protocol.rs` and
//! `src/feedback.rs` exactly.
//!
//! Whenever the real types change, these mirrors must be updated to match.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inline type mirrors
// ---------------------------------------------------------------------------

/// Mirror of src/protocol::AssignRequest
#[derive(Debug, Serialize)]
struct AssignRequest {
    student_id: i64,
    group_id: Option<i64>,
}

/// Mirror of src/protocol::SubmitResponse (inner report flattened away)
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    result: SubmissionReport,
}

#[derive(Debug, Deserialize, Default)]
struct SubmissionReport {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    results: Vec<TestCaseResult>,
}

#[derive(Debug, Deserialize, Default)]
struct TestCaseResult {
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    error: String,
    #[serde(default)]
    ai_feedback: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// Mirror of src/feedback::verdict_for
fn verdict_label(score: f64) -> &'static str {
    if score >= 70.0 {
        "Passed"
    } else if score >= 40.0 {
        "Partial"
    } else {
        "Failed"
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[test]
fn unassignment_serializes_as_json_null() {
    let body = AssignRequest {
        student_id: 12,
        group_id: None,
    };
    let json = serde_json::to_string(&body).unwrap();
    assert_eq!(json, r#"{"student_id":12,"group_id":null}"#);
}

#[test]
fn assignment_serializes_numeric_group() {
    let body = AssignRequest {
        student_id: 12,
        group_id: Some(3),
    };
    let json = serde_json::to_string(&body).unwrap();
    assert_eq!(json, r#"{"student_id":12,"group_id":3}"#);
}

#[test]
fn submit_envelope_parses_full_report() {
    let json = r#"{
        "message": "Solution submitted successfully",
        "result": {
            "score": 66.67,
            "results": [
                {"is_correct": true},
                {"is_correct": true},
                {"is_correct": false, "error": "Timeout", "ai_feedback": "Consider larger inputs"}
            ]
        }
    }"#;
    let resp: SubmitResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.message, "Solution submitted successfully");
    assert!((resp.result.score - 66.67).abs() < 1e-9);
    assert_eq!(resp.result.results.len(), 3);
    assert_eq!(
        resp.result.results.iter().filter(|r| r.is_correct).count(),
        2
    );
    assert_eq!(resp.result.results[2].error, "Timeout");
    assert_eq!(resp.result.results[2].ai_feedback, "Consider larger inputs");
}

#[test]
fn submit_envelope_tolerates_missing_fields() {
    let resp: SubmitResponse = serde_json::from_str("{}").unwrap();
    assert!(resp.message.is_empty());
    assert_eq!(resp.result.results.len(), 0);
}

#[test]
fn error_envelope_wins_over_status() {
    // Django views return the message body with varying status codes; the
    // body is authoritative.
    let body = r#"{"error": "Group name already exists"}"#;
    let parsed: Result<ErrorEnvelope, _> = serde_json::from_str(body);
    assert_eq!(parsed.unwrap().error, "Group name already exists");

    // A success body must not parse as an error envelope.
    let ok_body = r#"{"message": "Group created"}"#;
    assert!(serde_json::from_str::<ErrorEnvelope>(ok_body).is_err());
}

// ---------------------------------------------------------------------------
// Verdict bands
// ---------------------------------------------------------------------------

#[test]
fn verdict_bands_match_server_scoring() {
    assert_eq!(verdict_label(100.0), "Passed");
    assert_eq!(verdict_label(85.0), "Passed");
    assert_eq!(verdict_label(70.0), "Passed");
    assert_eq!(verdict_label(69.99), "Partial");
    assert_eq!(verdict_label(50.0), "Partial");
    assert_eq!(verdict_label(40.0), "Partial");
    assert_eq!(verdict_label(39.99), "Failed");
    assert_eq!(verdict_label(10.0), "Failed");
    assert_eq!(verdict_label(0.0), "Failed");
}
