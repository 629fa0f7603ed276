//! Result interpretation for the submission workspace.
//!
//! Maps raw evaluation reports into what the results panel actually shows:
//! a verdict band for the overall score, pass counts, and a feedback block
//! with degraded-AI sentinel lines filtered out.

use crate::protocol::{RunReport, SubmissionReport, TestCaseResult};

/// Overall verdict band for a 0–100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Partial,
    Failed,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Passed => "Passed",
            Verdict::Partial => "Partial",
            Verdict::Failed => "Failed",
        }
    }
}

/// Score >= 70 passes, >= 40 is partial credit, below that fails.
pub fn verdict_for(score: f64) -> Verdict {
    if score >= 70.0 {
        Verdict::Passed
    } else if score >= 40.0 {
        Verdict::Partial
    } else {
        Verdict::Failed
    }
}

/// Substrings the AI backend emits when it could not actually evaluate.
/// Matching feedback is hidden from the panel rather than shown raw.
const AI_SENTINELS: [&str; 3] = [
    "Ollama is not running",
    "Ollama connection error",
    "Ollama error:",
];

pub fn is_degraded_feedback(text: &str) -> bool {
    AI_SENTINELS.iter().any(|s| text.contains(s))
}

/// What the results panel renders after a submission.
#[derive(Debug, Clone)]
pub struct SubmissionView {
    pub score: f64,
    pub verdict: Verdict,
    pub passed: usize,
    pub total: usize,
    /// Per-test feedback lines, sentinel-filtered. May be empty.
    pub feedback: Vec<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl SubmissionView {
    pub fn from_report(report: &SubmissionReport) -> Self {
        let passed = report.results.iter().filter(|r| r.is_correct).count();
        Self {
            score: report.score,
            verdict: verdict_for(report.score),
            passed,
            total: report.results.len(),
            feedback: feedback_lines(&report.results),
            submitted_at: chrono::Utc::now(),
        }
    }

    /// Timestamp line for the results panel, in local time.
    pub fn submitted_label(&self) -> String {
        let local = self.submitted_at.with_timezone(&chrono::Local);
        format!("Submitted at {}", local.format("%H:%M:%S"))
    }
}

/// What the results panel renders after a single run.
#[derive(Debug, Clone)]
pub struct RunView {
    pub is_correct: bool,
    pub output: String,
    pub error: String,
    /// Sentinel-filtered; `None` when the backend feedback was degraded.
    pub feedback: Option<String>,
}

impl RunView {
    pub fn from_report(report: &RunReport) -> Self {
        let trimmed = report.ai_feedback.trim();
        let feedback = if trimmed.is_empty() || is_degraded_feedback(trimmed) {
            None
        } else {
            Some(trimmed.to_string())
        };
        Self {
            is_correct: report.is_correct,
            output: report.output.clone(),
            error: report.error.clone(),
            feedback,
        }
    }
}

/// Concatenated per-test feedback, one entry per test case with usable
/// feedback. Execution errors are kept; degraded AI lines are dropped.
fn feedback_lines(results: &[TestCaseResult]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, result) in results.iter().enumerate() {
        let status = if result.is_correct { "ok" } else { "failed" };
        if !result.error.is_empty() {
            lines.push(format!("Test {} ({}): {}", i + 1, status, result.error));
            continue;
        }
        let trimmed = result.ai_feedback.trim();
        if trimmed.is_empty() || is_degraded_feedback(trimmed) {
            continue;
        }
        lines.push(format!("Test {} ({}): {}", i + 1, status, trimmed));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SubmissionReport;

    fn case(is_correct: bool, feedback: &str) -> TestCaseResult {
        TestCaseResult {
            is_correct,
            ai_feedback: feedback.to_string(),
            ..TestCaseResult::default()
        }
    }

    #[test]
    fn verdict_bands() {
        assert_eq!(verdict_for(85.0), Verdict::Passed);
        assert_eq!(verdict_for(70.0), Verdict::Passed);
        assert_eq!(verdict_for(50.0), Verdict::Partial);
        assert_eq!(verdict_for(40.0), Verdict::Partial);
        assert_eq!(verdict_for(10.0), Verdict::Failed);
        assert_eq!(verdict_for(0.0), Verdict::Failed);
    }

    #[test]
    fn sentinel_feedback_never_rendered() {
        let report = SubmissionReport {
            score: 50.0,
            results: vec![
                case(true, "Good core logic."),
                case(false, "⚠️ Ollama is not running — no AI feedback available."),
                case(false, "Ollama connection error: connect refused"),
            ],
        };
        let view = SubmissionView::from_report(&report);
        assert_eq!(view.feedback.len(), 1);
        for line in &view.feedback {
            assert!(!line.contains("Ollama is not running"));
            assert!(!line.contains("Ollama connection error"));
        }
    }

    #[test]
    fn pass_counts_from_per_test_list() {
        let report = SubmissionReport {
            score: 66.7,
            results: vec![case(true, ""), case(true, ""), case(false, "")],
        };
        let view = SubmissionView::from_report(&report);
        assert_eq!(view.passed, 2);
        assert_eq!(view.total, 3);
        assert_eq!(view.verdict, Verdict::Partial);
    }

    #[test]
    fn submitted_label_carries_wall_clock_time() {
        let view = SubmissionView::from_report(&SubmissionReport::default());
        let label = view.submitted_label();
        assert!(label.starts_with("Submitted at "));
        // HH:MM:SS
        let time = label.trim_start_matches("Submitted at ");
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }

    #[test]
    fn execution_errors_survive_filtering() {
        let mut failing = case(false, "Ollama is not running");
        failing.error = "Compilation Error".to_string();
        let report = SubmissionReport {
            score: 0.0,
            results: vec![failing],
        };
        let view = SubmissionView::from_report(&report);
        assert_eq!(view.feedback.len(), 1);
        assert!(view.feedback[0].contains("Compilation Error"));
    }

    #[test]
    fn run_view_drops_degraded_feedback() {
        let report = RunReport {
            is_correct: true,
            ai_feedback: "Ollama error: 503".to_string(),
            ..RunReport::default()
        };
        assert!(RunView::from_report(&report).feedback.is_none());

        let report = RunReport {
            is_correct: true,
            ai_feedback: "Clean solution.".to_string(),
            ..RunReport::default()
        };
        assert_eq!(
            RunView::from_report(&report).feedback.as_deref(),
            Some("Clean solution.")
        );
    }
}
