//! Exam focus-mode guard state machine.
//!
//! Hierarchy:
//! ```text
//! Inactive ←→ Active (superstate)
//!                ├── Engaged
//!                ├── Warning          [window lost focus or was hidden]
//!                └── ConfirmingExit   [exit dialog up]
//! ```
//!
//! While active, the guard owns the denylisted shortcuts and the clipboard:
//! the frame loop asks [`blocked_shortcut`] *before* normal key routing and
//! dispatches `ShortcutBlocked`/`ClipboardBlocked` instead of acting. The
//! only way out is the confirmation dialog; window-manager tricks put the
//! guard in `Warning` rather than ending it.
//!
//! Handlers never touch the window themselves. They push [`FocusEffect`]s
//! into the outbox passed as dispatch context and the frame loop executes
//! them; the wrapper only hands out shared references to storage, so the
//! outbox lives with the caller.

use statig::prelude::*;
use tracing::info;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Events dispatched to the focus guard.
#[derive(Debug, Clone)]
pub enum FocusEvent {
    /// Student entered the exam editor with the guard binding.
    Begin,
    /// Window lost input focus or was occluded.
    WindowHidden,
    /// Window regained focus.
    WindowVisible,
    /// A denylisted shortcut was intercepted; payload names it for the toast.
    ShortcutBlocked(&'static str),
    /// Copy or paste was intercepted.
    ClipboardBlocked,
    /// Exit binding pressed; opens the confirmation dialog.
    ExitRequested,
    /// Dialog answered yes.
    ExitConfirmed,
    /// Dialog answered no (or Escape).
    ExitCancelled,
    /// The workspace left the editor, ending the exam.
    ForceEnd,
}

/// Side effects requested by the guard, executed by the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusEffect {
    RequestFullscreen,
    ReleaseFullscreen,
    Toast(String),
}

/// Shared storage for the focus guard. The guard keeps nothing between
/// dispatches; everything it wants done goes out through the context.
pub struct FocusMachine;

impl FocusMachine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FocusMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Is the guard intercepting input at all?
pub fn is_active(state: &State) -> bool {
    !matches!(state, State::Inactive {})
}

/// Name of the denylisted shortcut for a key press, if any. `key` is the
/// logical key name as the window system reports it, e.g. `"F12"` or `"i"`.
///
/// The list mirrors the browser devtools set: F12, Ctrl/Cmd+Shift+I/J/C,
/// Ctrl/Cmd+U (view source) and Ctrl/Cmd+S (save page).
pub fn blocked_shortcut(ctrl_or_cmd: bool, shift: bool, key: &str) -> Option<&'static str> {
    if key.eq_ignore_ascii_case("f12") {
        return Some("F12");
    }
    if !ctrl_or_cmd {
        return None;
    }
    if shift {
        return match key.to_ascii_lowercase().as_str() {
            "i" => Some("Ctrl+Shift+I"),
            "j" => Some("Ctrl+Shift+J"),
            "c" => Some("Ctrl+Shift+C"),
            _ => None,
        };
    }
    match key.to_ascii_lowercase().as_str() {
        "u" => Some("Ctrl+U"),
        "s" => Some("Ctrl+S"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// State machine implementation
// ---------------------------------------------------------------------------

#[state_machine(
    initial = "State::inactive()",
    state(derive(Debug, Clone, PartialEq))
)]
impl FocusMachine {
    // ------------------------------------------------------------------
    // Superstate: Active (parent of Engaged, Warning, ConfirmingExit)
    // ------------------------------------------------------------------

    /// Interception shared by all active substates.
    #[superstate]
    fn active(event: &FocusEvent, context: &mut Vec<FocusEffect>) -> Outcome<State> {
        match event {
            FocusEvent::ShortcutBlocked(name) => {
                info!(target: "focus", "blocked shortcut {name}");
                context.push(FocusEffect::Toast(format!(
                    "{name} is disabled during the exam."
                )));
                Handled
            }
            FocusEvent::ClipboardBlocked => {
                context.push(FocusEffect::Toast(
                    "Copy and paste are disabled during the exam.".to_string(),
                ));
                Handled
            }
            FocusEvent::ExitRequested => Transition(State::confirming_exit()),
            FocusEvent::ForceEnd => {
                context.push(FocusEffect::ReleaseFullscreen);
                Transition(State::inactive())
            }
            _ => Super,
        }
    }

    // ------------------------------------------------------------------
    // Leaf states
    // ------------------------------------------------------------------

    /// Guard off. Everything passes through untouched.
    #[state]
    fn inactive(event: &FocusEvent, context: &mut Vec<FocusEffect>) -> Outcome<State> {
        match event {
            FocusEvent::Begin => {
                info!(target: "focus", "focus mode engaged");
                context.push(FocusEffect::RequestFullscreen);
                context.push(FocusEffect::Toast(
                    "Focus Mode is on. Stay on this window until you finish.".to_string(),
                ));
                Transition(State::engaged())
            }
            _ => Handled,
        }
    }

    /// Exam running normally.
    #[state(superstate = "active")]
    fn engaged(event: &FocusEvent, context: &mut Vec<FocusEffect>) -> Outcome<State> {
        match event {
            FocusEvent::WindowHidden => {
                context.push(FocusEffect::RequestFullscreen);
                context.push(FocusEffect::Toast(
                    "Leaving the exam window was recorded.".to_string(),
                ));
                Transition(State::warning())
            }
            _ => Super,
        }
    }

    /// The window went away mid-exam. The banner stays up until focus
    /// returns; the guard itself never ends from here.
    #[state(superstate = "active")]
    fn warning(event: &FocusEvent) -> Outcome<State> {
        match event {
            FocusEvent::WindowVisible => Transition(State::engaged()),
            _ => Super,
        }
    }

    /// Exit dialog up. Interception continues while it is open.
    #[state(superstate = "active")]
    fn confirming_exit(event: &FocusEvent, context: &mut Vec<FocusEffect>) -> Outcome<State> {
        match event {
            FocusEvent::ExitConfirmed => {
                info!(target: "focus", "focus mode ended by student");
                context.push(FocusEffect::ReleaseFullscreen);
                Transition(State::inactive())
            }
            FocusEvent::ExitCancelled => Transition(State::engaged()),
            // A second exit press while the dialog is open changes nothing.
            FocusEvent::ExitRequested => Handled,
            _ => Super,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(sm: &mut StateMachine<FocusMachine>, event: FocusEvent) -> Vec<FocusEffect> {
        let mut effects = Vec::new();
        sm.handle_with_context(&event, &mut effects);
        effects
    }

    fn engaged_machine() -> StateMachine<FocusMachine> {
        let mut sm = FocusMachine::new().state_machine();
        dispatch(&mut sm, FocusEvent::Begin);
        sm
    }

    #[test]
    fn begin_requests_fullscreen() {
        let mut sm = FocusMachine::new().state_machine();
        let effects = dispatch(&mut sm, FocusEvent::Begin);
        assert_eq!(*sm.state(), State::engaged());
        assert!(effects.contains(&FocusEffect::RequestFullscreen));
    }

    #[test]
    fn inactive_ignores_interception_events() {
        let mut sm = FocusMachine::new().state_machine();
        let mut effects = dispatch(&mut sm, FocusEvent::ShortcutBlocked("F12"));
        effects.extend(dispatch(&mut sm, FocusEvent::WindowHidden));
        assert_eq!(*sm.state(), State::inactive());
        assert!(effects.is_empty());
    }

    #[test]
    fn blocked_shortcut_toasts_without_leaving_state() {
        let mut sm = engaged_machine();
        let effects = dispatch(&mut sm, FocusEvent::ShortcutBlocked("Ctrl+Shift+I"));
        assert_eq!(*sm.state(), State::engaged());
        assert!(matches!(&effects[..], [FocusEffect::Toast(msg)] if msg.contains("Ctrl+Shift+I")));
    }

    #[test]
    fn hidden_window_warns_and_recovers() {
        let mut sm = engaged_machine();
        dispatch(&mut sm, FocusEvent::WindowHidden);
        assert_eq!(*sm.state(), State::warning());

        // Interception keeps working while warned.
        dispatch(&mut sm, FocusEvent::ClipboardBlocked);
        assert_eq!(*sm.state(), State::warning());

        dispatch(&mut sm, FocusEvent::WindowVisible);
        assert_eq!(*sm.state(), State::engaged());
    }

    #[test]
    fn hidden_window_retries_fullscreen() {
        let mut sm = engaged_machine();
        let effects = dispatch(&mut sm, FocusEvent::WindowHidden);
        assert_eq!(*sm.state(), State::warning());
        assert!(effects.contains(&FocusEffect::RequestFullscreen));
        assert!(effects.iter().any(|e| matches!(e, FocusEffect::Toast(_))));
    }

    #[test]
    fn exit_needs_confirmation() {
        let mut sm = engaged_machine();
        dispatch(&mut sm, FocusEvent::ExitRequested);
        assert_eq!(*sm.state(), State::confirming_exit());

        dispatch(&mut sm, FocusEvent::ExitCancelled);
        assert_eq!(*sm.state(), State::engaged());

        dispatch(&mut sm, FocusEvent::ExitRequested);
        let effects = dispatch(&mut sm, FocusEvent::ExitConfirmed);
        assert_eq!(*sm.state(), State::inactive());
        assert!(effects.contains(&FocusEffect::ReleaseFullscreen));
    }

    #[test]
    fn full_cycle_restores_passthrough() {
        let mut sm = engaged_machine();
        dispatch(&mut sm, FocusEvent::ExitRequested);
        dispatch(&mut sm, FocusEvent::ExitConfirmed);

        // Guard is off again: interception events do nothing.
        let effects = dispatch(&mut sm, FocusEvent::ShortcutBlocked("Ctrl+U"));
        assert!(effects.is_empty());
        assert!(!is_active(sm.state()));
    }

    #[test]
    fn force_end_releases_fullscreen_from_any_substate() {
        let mut sm = engaged_machine();
        dispatch(&mut sm, FocusEvent::WindowHidden);
        let effects = dispatch(&mut sm, FocusEvent::ForceEnd);
        assert_eq!(*sm.state(), State::inactive());
        assert!(effects.contains(&FocusEffect::ReleaseFullscreen));
    }

    #[test]
    fn denylist_covers_devtools_set() {
        assert_eq!(blocked_shortcut(false, false, "F12"), Some("F12"));
        assert_eq!(blocked_shortcut(true, true, "I"), Some("Ctrl+Shift+I"));
        assert_eq!(blocked_shortcut(true, true, "j"), Some("Ctrl+Shift+J"));
        assert_eq!(blocked_shortcut(true, true, "c"), Some("Ctrl+Shift+C"));
        assert_eq!(blocked_shortcut(true, false, "u"), Some("Ctrl+U"));
        assert_eq!(blocked_shortcut(true, false, "s"), Some("Ctrl+S"));
        // Plain typing is never intercepted.
        assert_eq!(blocked_shortcut(false, false, "i"), None);
        assert_eq!(blocked_shortcut(true, false, "i"), None);
        assert_eq!(blocked_shortcut(false, true, "c"), None);
    }
}
