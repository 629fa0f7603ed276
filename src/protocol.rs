//! CodeQuest backend wire types.
//!
//! Defines the JSON structures exchanged with the Django server. All inbound
//! types derive `Deserialize` with permissive `#[serde(default)]` fields so a
//! partially populated response never fails to parse; the server is free to
//! omit anything it has no value for.
//!
//! The server contract (paths, shapes, the `X-CSRFToken` header echoed from
//! the `csrftoken` cookie) lives in `api.rs`; this module is shapes only.

use serde::{Deserialize, Serialize};

/// A coding question as returned by `GET /student/question/{id}/`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Question {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub marks: i64,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub example_input: String,
    #[serde(default)]
    pub example_output: String,
}

/// A student summary inside a group card.
#[derive(Debug, Deserialize, Clone)]
pub struct StudentSummary {
    pub id: i64,
    #[serde(default)]
    pub username: String,
}

/// A faculty-owned student group.
#[derive(Debug, Deserialize, Clone)]
pub struct Group {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub student_count: u64,
    #[serde(default)]
    pub students: Vec<StudentSummary>,
}

/// A student row with its optional current group.
#[derive(Debug, Deserialize, Clone)]
pub struct Student {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub group_name: Option<String>,
}

/// `GET /faculty/groups/` envelope.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GroupsResponse {
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// `GET /faculty/students/` envelope.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StudentsResponse {
    #[serde(default)]
    pub students: Vec<Student>,
}

/// `POST /faculty/students/assign/` request body.
///
/// `group_id` is `None` for unassignment and must serialize as JSON `null`,
/// never the string `"null"` or an empty string — the server distinguishes
/// "remove from group" from "invalid group" by the null.
#[derive(Debug, Serialize, Clone)]
pub struct AssignRequest {
    pub student_id: i64,
    pub group_id: Option<i64>,
}

/// `POST /faculty/groups/create/` request body.
#[derive(Debug, Serialize, Clone)]
pub struct CreateGroupRequest {
    pub name: String,
}

/// `POST /student/submit/{id}/` request body. The language travels as its
/// lowercase wire name.
#[derive(Debug, Serialize, Clone)]
pub struct SubmitRequest {
    pub code: String,
    pub language: String,
}

/// Outcome of one test case inside a submission report.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TestCaseResult {
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub ai_feedback: String,
}

/// Full evaluation report from `POST /student/submit/{id}/`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SubmissionReport {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub results: Vec<TestCaseResult>,
}

/// `POST /student/submit/{id}/` envelope.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SubmitResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: SubmissionReport,
}

/// Single-test report from `POST /student/run_code/`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RunReport {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub ai_feedback: String,
}

/// `{message}` envelope returned by the mutation endpoints on success.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// The languages the grading backend compiles and runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Cpp,
    Java,
    C,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Python, Language::Cpp, Language::Java, Language::C];

    /// Wire name — the server lowercases before dispatching to a toolchain.
    pub fn wire_name(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::C => "c",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::C => "C",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_parses_with_missing_fields() {
        let q: Question =
            serde_json::from_str(r#"{"id": 7, "title": "Two Sum"}"#).expect("parse failed");
        assert_eq!(q.id, 7);
        assert_eq!(q.title, "Two Sum");
        assert_eq!(q.marks, 0);
        assert!(q.constraints.is_empty());
    }

    #[test]
    fn assign_request_serializes_null_group() {
        let req = AssignRequest {
            student_id: 12,
            group_id: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"student_id":12,"group_id":null}"#);
    }

    #[test]
    fn assign_request_serializes_numeric_group() {
        let req = AssignRequest {
            student_id: 12,
            group_id: Some(3),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"student_id":12,"group_id":3}"#);
    }

    #[test]
    fn submission_report_parses_server_shape() {
        let body = r#"{
            "message": "Submission evaluated!",
            "result": {
                "score": 50.0,
                "results": [
                    {"input": "2", "expected": "4", "output": "4", "error": "",
                     "is_correct": true, "ai_feedback": "Good core logic."},
                    {"input": "5", "expected": "10", "output": "11", "error": "",
                     "is_correct": false, "ai_feedback": "Off by one."}
                ]
            }
        }"#;
        let resp: SubmitResponse = serde_json::from_str(body).expect("parse failed");
        assert_eq!(resp.result.results.len(), 2);
        assert!(resp.result.results[0].is_correct);
        assert!((resp.result.score - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn language_wire_names_are_lowercase() {
        for lang in Language::ALL {
            let name = lang.wire_name();
            assert_eq!(name, name.to_lowercase());
        }
    }
}
