//! Hierarchical state machines driving the UI.
//!
//! Both machines are pure: handlers mutate storage and queue effects, the
//! frame loop in `main.rs` executes the effects and feeds results back in.

pub mod focus_sm;
pub mod workspace_sm;
