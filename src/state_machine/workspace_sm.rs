//! Student workspace state machine.
//!
//! Hierarchy:
//! ```text
//! QuestionList → LoadingQuestion { id } → LanguagePicker → InEditor (superstate)
//!                                                             ├── EditorIdle
//!                                                             ├── EditorRunning
//!                                                             └── EditorSubmitting
//! ```
//!
//! Handlers never touch the network or the filesystem. They record
//! [`WorkspaceEffect`]s in the outbox passed as dispatch context; the frame
//! loop drains and executes them, then feeds completions back in as events.
//! The code buffer itself lives with the frame loop (the state machine
//! wrapper only hands out shared references to storage), so run and submit
//! requests carry a snapshot of the buffer. Responses that arrive after the
//! student has already navigated away hit a state that no longer listens for
//! them and fall through to `Handled`.

use statig::prelude::*;
use tracing::{info, warn};

use crate::feedback::{RunView, SubmissionView};
use crate::protocol::{Language, Question};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events dispatched to the workspace state machine.
#[derive(Debug, Clone)]
pub enum WorkspaceEvent {
    /// Student confirmed a question id on the list screen.
    QuestionSelected(i64),
    /// Question detail fetch completed.
    QuestionLoaded(Question),
    /// Question detail fetch failed.
    QuestionLoadFailed(String),
    /// Student picked a language card.
    LanguageSelected(Language),
    /// Run binding pressed; carries the current buffer contents.
    RunRequested { code: String },
    RunFinished(RunView),
    RunFailed(String),
    /// Submit binding pressed; carries the current buffer contents.
    SubmitRequested { code: String },
    SubmitFinished(SubmissionView),
    SubmitFailed(String),
    /// Escape from the editor back to the language cards.
    BackToLanguages,
    /// Escape from the language cards back to the question list.
    BackToQuestions,
}

/// Side effects requested by the state machine, executed by the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEffect {
    /// Fetch `GET /student/question/{id}/`.
    LoadQuestion(i64),
    /// Post the buffer against the question's example pair.
    RunCode {
        code: String,
        language: Language,
        input: String,
        expected: String,
    },
    /// Post the buffer for full evaluation.
    SubmitCode {
        question_id: i64,
        code: String,
        language: Language,
    },
    /// Load any saved draft for this question into the buffer.
    RestoreDraft(i64),
    /// Delete the saved draft for this question.
    ClearDraft(i64),
    /// Empty the code buffer; the question it belonged to is gone.
    ResetBuffer,
    /// Leaving the workspace must also release the exam guard.
    ExitFocusMode,
    Toast(String),
}

// ---------------------------------------------------------------------------
// Shared storage
// ---------------------------------------------------------------------------

/// Shared storage for the workspace state machine.
///
/// `question`/`language` are the student's current selection; the render
/// pass reads them (and the result views) through the wrapper's `Deref`.
pub struct WorkspaceMachine {
    pub question: Option<Question>,
    pub language: Option<Language>,
    pub run_view: Option<RunView>,
    pub submission: Option<SubmissionView>,
}

impl WorkspaceMachine {
    pub fn new() -> Self {
        Self {
            question: None,
            language: None,
            run_view: None,
            submission: None,
        }
    }

    /// Drop everything tied to the current question.
    fn reset_question(&mut self) {
        self.question = None;
        self.language = None;
        self.run_view = None;
        self.submission = None;
    }
}

impl Default for WorkspaceMachine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// State machine implementation
// ---------------------------------------------------------------------------

#[state_machine(
    initial = "State::question_list()",
    state(derive(Debug, Clone, PartialEq))
)]
impl WorkspaceMachine {
    // ------------------------------------------------------------------
    // Superstate: InEditor (parent of Idle, Running, Submitting)
    // ------------------------------------------------------------------

    /// Navigation shared by all editor substates. Leaving the editor in any
    /// direction ends the exam guard; leaving the question entirely also
    /// clears the local draft.
    #[superstate]
    fn in_editor(
        &mut self,
        event: &WorkspaceEvent,
        context: &mut Vec<WorkspaceEffect>,
    ) -> Outcome<State> {
        match event {
            WorkspaceEvent::BackToLanguages => {
                context.push(WorkspaceEffect::ExitFocusMode);
                self.run_view = None;
                self.submission = None;
                Transition(State::language_picker())
            }
            WorkspaceEvent::BackToQuestions => {
                if let Some(q) = &self.question {
                    context.push(WorkspaceEffect::ClearDraft(q.id));
                }
                context.push(WorkspaceEffect::ResetBuffer);
                context.push(WorkspaceEffect::ExitFocusMode);
                self.reset_question();
                Transition(State::question_list())
            }
            _ => Super,
        }
    }

    // ------------------------------------------------------------------
    // Leaf states
    // ------------------------------------------------------------------

    /// Entry screen: a digit buffer for the question id.
    #[state]
    fn question_list(
        event: &WorkspaceEvent,
        context: &mut Vec<WorkspaceEffect>,
    ) -> Outcome<State> {
        match event {
            WorkspaceEvent::QuestionSelected(id) => {
                info!(target: "workspace", "loading question {id}");
                context.push(WorkspaceEffect::LoadQuestion(*id));
                Transition(State::loading_question(*id))
            }
            _ => Handled,
        }
    }

    /// Question detail fetch in flight.
    #[state]
    fn loading_question(
        &mut self,
        event: &WorkspaceEvent,
        context: &mut Vec<WorkspaceEffect>,
        id: &i64,
    ) -> Outcome<State> {
        match event {
            WorkspaceEvent::QuestionLoaded(question) => {
                if question.id != *id {
                    warn!(target: "workspace", "ignoring stale question {}", question.id);
                    return Handled;
                }
                self.question = Some(question.clone());
                Transition(State::language_picker())
            }
            WorkspaceEvent::QuestionLoadFailed(msg) => {
                warn!(target: "workspace", "question {id} failed to load: {msg}");
                context.push(WorkspaceEffect::Toast(format!(
                    "Could not load question {id}: {msg}"
                )));
                Transition(State::question_list())
            }
            _ => Handled,
        }
    }

    /// Question loaded, waiting for a language choice.
    #[state]
    fn language_picker(
        &mut self,
        event: &WorkspaceEvent,
        context: &mut Vec<WorkspaceEffect>,
    ) -> Outcome<State> {
        match event {
            WorkspaceEvent::LanguageSelected(language) => {
                self.language = Some(*language);
                if let Some(q) = &self.question {
                    context.push(WorkspaceEffect::RestoreDraft(q.id));
                }
                Transition(State::editor_idle())
            }
            WorkspaceEvent::BackToQuestions => {
                context.push(WorkspaceEffect::ResetBuffer);
                self.reset_question();
                Transition(State::question_list())
            }
            _ => Handled,
        }
    }

    /// Editing. Run and submit requests are only accepted here, so at most
    /// one grading request is ever in flight.
    #[state(superstate = "in_editor")]
    fn editor_idle(
        &mut self,
        event: &WorkspaceEvent,
        context: &mut Vec<WorkspaceEffect>,
    ) -> Outcome<State> {
        match event {
            WorkspaceEvent::RunRequested { code } => {
                let (question, language) = match (&self.question, self.language) {
                    (Some(q), Some(l)) => (q, l),
                    _ => return Handled,
                };
                if code.trim().is_empty() {
                    context.push(WorkspaceEffect::Toast("Nothing to run yet.".to_string()));
                    return Handled;
                }
                context.push(WorkspaceEffect::RunCode {
                    code: code.clone(),
                    language,
                    input: question.example_input.clone(),
                    expected: question.example_output.clone(),
                });
                Transition(State::editor_running())
            }
            WorkspaceEvent::SubmitRequested { code } => {
                let (question_id, language) = match (&self.question, self.language) {
                    (Some(q), Some(l)) => (q.id, l),
                    _ => return Handled,
                };
                if code.trim().is_empty() {
                    context.push(WorkspaceEffect::Toast(
                        "Write some code before submitting.".to_string(),
                    ));
                    return Handled;
                }
                context.push(WorkspaceEffect::SubmitCode {
                    question_id,
                    code: code.clone(),
                    language,
                });
                Transition(State::editor_submitting())
            }
            _ => Super,
        }
    }

    /// Ad-hoc run in flight. Further run/submit presses are swallowed.
    #[state(superstate = "in_editor")]
    fn editor_running(
        &mut self,
        event: &WorkspaceEvent,
        context: &mut Vec<WorkspaceEffect>,
    ) -> Outcome<State> {
        match event {
            WorkspaceEvent::RunFinished(view) => {
                self.run_view = Some(view.clone());
                Transition(State::editor_idle())
            }
            WorkspaceEvent::RunFailed(msg) => {
                context.push(WorkspaceEffect::Toast(format!("Run failed: {msg}")));
                Transition(State::editor_idle())
            }
            _ => Super,
        }
    }

    /// Full submission in flight.
    #[state(superstate = "in_editor")]
    fn editor_submitting(
        &mut self,
        event: &WorkspaceEvent,
        context: &mut Vec<WorkspaceEffect>,
    ) -> Outcome<State> {
        match event {
            WorkspaceEvent::SubmitFinished(view) => {
                info!(target: "workspace", score = view.score, "submission graded");
                self.submission = Some(view.clone());
                if let Some(q) = &self.question {
                    context.push(WorkspaceEffect::ClearDraft(q.id));
                }
                Transition(State::editor_idle())
            }
            WorkspaceEvent::SubmitFailed(msg) => {
                context.push(WorkspaceEffect::Toast(format!("Submission failed: {msg}")));
                Transition(State::editor_idle())
            }
            _ => Super,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{RunReport, SubmissionReport};

    fn dispatch(
        sm: &mut StateMachine<WorkspaceMachine>,
        event: WorkspaceEvent,
    ) -> Vec<WorkspaceEffect> {
        let mut effects = Vec::new();
        sm.handle_with_context(&event, &mut effects);
        effects
    }

    fn empty_run_view() -> RunView {
        RunView::from_report(&RunReport::default())
    }

    fn empty_submission_view() -> SubmissionView {
        SubmissionView::from_report(&SubmissionReport::default())
    }

    fn sample_question(id: i64) -> Question {
        Question {
            id,
            title: "Two Sum".to_string(),
            example_input: "1 2".to_string(),
            example_output: "3".to_string(),
            ..Question::default()
        }
    }

    fn machine_in_editor() -> StateMachine<WorkspaceMachine> {
        let mut sm = WorkspaceMachine::new().state_machine();
        dispatch(&mut sm, WorkspaceEvent::QuestionSelected(7));
        dispatch(&mut sm, WorkspaceEvent::QuestionLoaded(sample_question(7)));
        dispatch(&mut sm, WorkspaceEvent::LanguageSelected(Language::Python));
        sm
    }

    #[test]
    fn happy_path_reaches_editor() {
        let mut sm = WorkspaceMachine::new().state_machine();
        assert_eq!(*sm.state(), State::question_list());

        let effects = dispatch(&mut sm, WorkspaceEvent::QuestionSelected(7));
        assert_eq!(*sm.state(), State::loading_question(7));
        assert!(effects.contains(&WorkspaceEffect::LoadQuestion(7)));

        dispatch(&mut sm, WorkspaceEvent::QuestionLoaded(sample_question(7)));
        assert_eq!(*sm.state(), State::language_picker());

        let effects = dispatch(&mut sm, WorkspaceEvent::LanguageSelected(Language::Cpp));
        assert_eq!(*sm.state(), State::editor_idle());
        assert!(effects.contains(&WorkspaceEffect::RestoreDraft(7)));
        assert_eq!(sm.language, Some(Language::Cpp));
    }

    #[test]
    fn load_failure_returns_to_list_with_toast() {
        let mut sm = WorkspaceMachine::new().state_machine();
        dispatch(&mut sm, WorkspaceEvent::QuestionSelected(9));
        let effects = dispatch(
            &mut sm,
            WorkspaceEvent::QuestionLoadFailed("server returned 500".to_string()),
        );

        assert_eq!(*sm.state(), State::question_list());
        assert!(matches!(&effects[..], [WorkspaceEffect::Toast(msg)] if msg.contains('9')));
    }

    #[test]
    fn stale_question_response_is_dropped() {
        let mut sm = WorkspaceMachine::new().state_machine();
        dispatch(&mut sm, WorkspaceEvent::QuestionSelected(7));
        dispatch(&mut sm, WorkspaceEvent::QuestionLoaded(sample_question(3)));
        assert_eq!(*sm.state(), State::loading_question(7));
        assert!(sm.question.is_none());
    }

    #[test]
    fn run_requires_code() {
        let mut sm = machine_in_editor();
        let effects = dispatch(
            &mut sm,
            WorkspaceEvent::RunRequested {
                code: "   \n".to_string(),
            },
        );

        assert_eq!(*sm.state(), State::editor_idle());
        assert!(matches!(&effects[..], [WorkspaceEffect::Toast(_)]));
    }

    #[test]
    fn run_round_trip() {
        let mut sm = machine_in_editor();
        let effects = dispatch(
            &mut sm,
            WorkspaceEvent::RunRequested {
                code: "print(3)".to_string(),
            },
        );
        assert_eq!(*sm.state(), State::editor_running());

        match &effects[..] {
            [WorkspaceEffect::RunCode { code, language, input, expected }] => {
                assert_eq!(code, "print(3)");
                assert_eq!(*language, Language::Python);
                assert_eq!(input, "1 2");
                assert_eq!(expected, "3");
            }
            other => panic!("unexpected effects: {other:?}"),
        }

        // A second press while running is swallowed.
        let effects = dispatch(
            &mut sm,
            WorkspaceEvent::RunRequested {
                code: "print(3)".to_string(),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(*sm.state(), State::editor_running());

        dispatch(&mut sm, WorkspaceEvent::RunFinished(empty_run_view()));
        assert_eq!(*sm.state(), State::editor_idle());
        assert!(sm.run_view.is_some());
    }

    #[test]
    fn successful_submit_clears_draft() {
        let mut sm = machine_in_editor();
        dispatch(
            &mut sm,
            WorkspaceEvent::SubmitRequested {
                code: "print(3)".to_string(),
            },
        );
        assert_eq!(*sm.state(), State::editor_submitting());

        let effects = dispatch(
            &mut sm,
            WorkspaceEvent::SubmitFinished(empty_submission_view()),
        );
        assert_eq!(*sm.state(), State::editor_idle());
        assert!(sm.submission.is_some());
        assert!(effects.contains(&WorkspaceEffect::ClearDraft(7)));
    }

    #[test]
    fn failed_submit_keeps_draft() {
        let mut sm = machine_in_editor();
        dispatch(
            &mut sm,
            WorkspaceEvent::SubmitRequested {
                code: "print(3)".to_string(),
            },
        );

        let effects = dispatch(
            &mut sm,
            WorkspaceEvent::SubmitFailed("timed out".to_string()),
        );
        assert_eq!(*sm.state(), State::editor_idle());
        assert!(!effects.iter().any(|e| matches!(e, WorkspaceEffect::ClearDraft(_))));
        assert!(effects.iter().any(|e| matches!(e, WorkspaceEffect::Toast(_))));
    }

    #[test]
    fn leaving_question_clears_draft_and_focus() {
        let mut sm = machine_in_editor();
        let effects = dispatch(&mut sm, WorkspaceEvent::BackToQuestions);

        assert_eq!(*sm.state(), State::question_list());
        assert!(sm.question.is_none());
        assert!(effects.contains(&WorkspaceEffect::ClearDraft(7)));
        assert!(effects.contains(&WorkspaceEffect::ResetBuffer));
        assert!(effects.contains(&WorkspaceEffect::ExitFocusMode));
    }

    #[test]
    fn back_to_languages_keeps_question() {
        let mut sm = machine_in_editor();
        let effects = dispatch(&mut sm, WorkspaceEvent::BackToLanguages);
        assert_eq!(*sm.state(), State::language_picker());
        assert!(sm.question.is_some());
        assert!(effects.contains(&WorkspaceEffect::ExitFocusMode));
    }

    #[test]
    fn late_run_response_after_leaving_is_dropped() {
        let mut sm = machine_in_editor();
        dispatch(
            &mut sm,
            WorkspaceEvent::RunRequested {
                code: "x".to_string(),
            },
        );
        dispatch(&mut sm, WorkspaceEvent::BackToLanguages);

        // The run completes after the student already left the editor.
        dispatch(&mut sm, WorkspaceEvent::RunFinished(empty_run_view()));
        assert_eq!(*sm.state(), State::language_picker());
        assert!(sm.run_view.is_none());
    }
}
