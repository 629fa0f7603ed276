//! Faculty group management panel.
//!
//! Flat struct rather than a statig machine: the panel has no hierarchy,
//! just two caches (groups, students), a name input, and a selection. Like
//! the workspace it never performs IO; it queues [`FacultyEffect`]s for the
//! frame loop and digests [`ApiEvent`] completions through [`apply`].
//!
//! Refresh policy after a mutation mirrors the server's ownership of truth:
//! a successful create reloads groups *and* students (group cards embed
//! member lists), an assignment outcome reloads students only, and a failed
//! mutation still reloads so the panel never renders an optimistic state.
//!
//! [`apply`]: GroupPanel::apply

use tracing::{info, warn};

use crate::api::ApiEvent;
use crate::protocol::{Group, Student};

/// Side effects requested by the panel, executed by the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum FacultyEffect {
    LoadGroups,
    LoadStudents,
    CreateGroup(String),
    Assign {
        student_id: i64,
        group_id: Option<i64>,
    },
    Toast(String),
}

/// Which control has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    NameInput,
    StudentTable,
}

pub struct GroupPanel {
    pub groups: Vec<Group>,
    pub students: Vec<Student>,
    pub name_input: String,
    /// Highlighted row in the student table.
    pub row: usize,
    /// Pending group choice for the highlighted student. Index into
    /// `groups`, or `None` for "Unassigned".
    pub choice: Option<usize>,
    pub focus: PanelFocus,
    pub loading: bool,
    pub effects: Vec<FacultyEffect>,
}

impl GroupPanel {
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            students: Vec::new(),
            name_input: String::new(),
            row: 0,
            choice: None,
            focus: PanelFocus::NameInput,
            loading: false,
            effects: Vec::new(),
        }
    }

    fn emit(&mut self, effect: FacultyEffect) {
        self.effects.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<FacultyEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Initial load when the panel opens.
    pub fn init(&mut self) {
        self.loading = true;
        self.emit(FacultyEffect::LoadGroups);
        self.emit(FacultyEffect::LoadStudents);
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            PanelFocus::NameInput => PanelFocus::StudentTable,
            PanelFocus::StudentTable => PanelFocus::NameInput,
        };
    }

    pub fn type_char(&mut self, ch: char) {
        if self.focus == PanelFocus::NameInput && !ch.is_control() {
            self.name_input.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == PanelFocus::NameInput {
            self.name_input.pop();
        }
    }

    /// Submit the create-group form. Blank names never reach the server.
    pub fn submit_name(&mut self) {
        let name = self.name_input.trim().to_string();
        if name.is_empty() {
            self.emit(FacultyEffect::Toast("Group name cannot be empty.".to_string()));
            return;
        }
        self.emit(FacultyEffect::CreateGroup(name));
    }

    pub fn move_row(&mut self, delta: i64) {
        if self.students.is_empty() {
            return;
        }
        let last = self.students.len() as i64 - 1;
        let next = (self.row as i64 + delta).clamp(0, last);
        if next as usize != self.row {
            self.row = next as usize;
            self.choice = self.current_group_index();
        }
    }

    /// Index into `groups` of the highlighted student's current group.
    fn current_group_index(&self) -> Option<usize> {
        let student = self.students.get(self.row)?;
        let gid = student.group_id?;
        self.groups.iter().position(|g| g.id == gid)
    }

    /// Step the pending group choice left or right through
    /// `Unassigned, groups[0], groups[1], ...`.
    pub fn cycle_choice(&mut self, forward: bool) {
        if self.groups.is_empty() {
            return;
        }
        self.choice = if forward {
            match self.choice {
                None => Some(0),
                Some(i) if i + 1 < self.groups.len() => Some(i + 1),
                Some(_) => None,
            }
        } else {
            match self.choice {
                None => Some(self.groups.len() - 1),
                Some(0) => None,
                Some(i) => Some(i - 1),
            }
        };
    }

    pub fn choice_label(&self) -> &str {
        match self.choice.and_then(|i| self.groups.get(i)) {
            Some(group) => &group.name,
            None => "Unassigned",
        }
    }

    /// Commit the pending choice for the highlighted student.
    pub fn assign_selected(&mut self) {
        let Some(student) = self.students.get(self.row) else {
            return;
        };
        let group_id = self.choice.and_then(|i| self.groups.get(i)).map(|g| g.id);
        if group_id == student.group_id {
            return;
        }
        self.emit(FacultyEffect::Assign {
            student_id: student.id,
            group_id,
        });
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Digest an API completion. Returns `true` if the event belonged to
    /// this panel.
    pub fn apply(&mut self, event: &ApiEvent) -> bool {
        match event {
            ApiEvent::Groups(Ok(resp)) => {
                self.loading = false;
                self.groups = resp.groups.clone();
                if self.choice.is_none() {
                    self.choice = self.current_group_index();
                }
                true
            }
            ApiEvent::Groups(Err(msg)) => {
                // Keep whatever cache we had; an error banner beats a blank panel.
                self.loading = false;
                warn!(target: "faculty", "group load failed: {msg}");
                self.emit(FacultyEffect::Toast(format!("Could not load groups: {msg}")));
                true
            }
            ApiEvent::Students(Ok(resp)) => {
                self.loading = false;
                self.students = resp.students.clone();
                if self.row >= self.students.len() {
                    self.row = self.students.len().saturating_sub(1);
                }
                self.choice = self.current_group_index();
                true
            }
            ApiEvent::Students(Err(msg)) => {
                self.loading = false;
                warn!(target: "faculty", "student load failed: {msg}");
                self.emit(FacultyEffect::Toast(format!(
                    "Could not load students: {msg}"
                )));
                true
            }
            ApiEvent::GroupCreated(Ok(resp)) => {
                info!(target: "faculty", "group created: {}", resp.message);
                self.name_input.clear();
                self.emit(FacultyEffect::Toast(resp.message.clone()));
                self.emit(FacultyEffect::LoadGroups);
                self.emit(FacultyEffect::LoadStudents);
                true
            }
            ApiEvent::GroupCreated(Err(msg)) => {
                self.emit(FacultyEffect::Toast(format!("Create failed: {msg}")));
                true
            }
            ApiEvent::StudentAssigned(Ok(resp)) => {
                // Group cards embed member counts and lists, so both caches
                // go stale when an assignment lands.
                self.emit(FacultyEffect::Toast(resp.message.clone()));
                self.emit(FacultyEffect::LoadGroups);
                self.emit(FacultyEffect::LoadStudents);
                true
            }
            ApiEvent::StudentAssigned(Err(msg)) => {
                self.emit(FacultyEffect::Toast(format!("Assignment failed: {msg}")));
                self.emit(FacultyEffect::LoadStudents);
                true
            }
            _ => false,
        }
    }
}

impl Default for GroupPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{GroupsResponse, MessageResponse, StudentsResponse};

    fn group(id: i64, name: &str) -> Group {
        Group {
            id,
            name: name.to_string(),
            student_count: 0,
            students: Vec::new(),
        }
    }

    fn student(id: i64, group_id: Option<i64>) -> Student {
        Student {
            id,
            username: format!("student{id}"),
            group_id,
            group_name: None,
        }
    }

    fn loaded_panel() -> GroupPanel {
        let mut panel = GroupPanel::new();
        panel.init();
        panel.take_effects();
        panel.apply(&ApiEvent::Groups(Ok(GroupsResponse {
            groups: vec![group(1, "Alpha"), group(2, "Beta")],
        })));
        panel.apply(&ApiEvent::Students(Ok(StudentsResponse {
            students: vec![student(10, None), student(11, Some(2))],
        })));
        panel.take_effects();
        panel
    }

    #[test]
    fn init_requests_both_loads() {
        let mut panel = GroupPanel::new();
        panel.init();
        assert_eq!(
            panel.take_effects(),
            vec![FacultyEffect::LoadGroups, FacultyEffect::LoadStudents]
        );
        assert!(panel.loading);
    }

    #[test]
    fn blank_name_never_reaches_server() {
        let mut panel = loaded_panel();
        panel.name_input = "   ".to_string();
        panel.submit_name();
        let effects = panel.take_effects();
        assert!(matches!(&effects[..], [FacultyEffect::Toast(_)]));
    }

    #[test]
    fn submit_trims_name() {
        let mut panel = loaded_panel();
        panel.name_input = "  Gamma  ".to_string();
        panel.submit_name();
        assert_eq!(
            panel.take_effects(),
            vec![FacultyEffect::CreateGroup("Gamma".to_string())]
        );
    }

    #[test]
    fn create_success_clears_input_and_reloads_everything() {
        let mut panel = loaded_panel();
        panel.name_input = "Gamma".to_string();
        panel.apply(&ApiEvent::GroupCreated(Ok(crate::protocol::MessageResponse {
            message: "Group created".to_string(),
        })));

        assert!(panel.name_input.is_empty());
        let effects = panel.take_effects();
        assert!(effects.contains(&FacultyEffect::LoadGroups));
        assert!(effects.contains(&FacultyEffect::LoadStudents));
    }

    #[test]
    fn create_failure_keeps_input() {
        let mut panel = loaded_panel();
        panel.name_input = "Gamma".to_string();
        panel.apply(&ApiEvent::GroupCreated(Err("name taken".to_string())));

        assert_eq!(panel.name_input, "Gamma");
        let effects = panel.take_effects();
        assert!(matches!(&effects[..], [FacultyEffect::Toast(msg)] if msg.contains("name taken")));
    }

    #[test]
    fn assign_sends_null_for_unassigned() {
        let mut panel = loaded_panel();
        panel.move_row(1); // student 11, currently in Beta
        assert_eq!(panel.choice_label(), "Beta");

        panel.cycle_choice(true); // Beta -> Unassigned (wraps past the end)
        assert_eq!(panel.choice_label(), "Unassigned");
        panel.assign_selected();

        assert_eq!(
            panel.take_effects(),
            vec![FacultyEffect::Assign {
                student_id: 11,
                group_id: None,
            }]
        );
    }

    #[test]
    fn assign_skips_noop_choice() {
        let mut panel = loaded_panel();
        panel.move_row(1);
        panel.assign_selected(); // choice == current group
        assert!(panel.take_effects().is_empty());
    }

    #[test]
    fn assignment_success_reloads_groups_and_students() {
        let mut panel = loaded_panel();
        panel.apply(&ApiEvent::StudentAssigned(Ok(MessageResponse {
            message: "Student moved.".to_string(),
        })));
        let effects = panel.take_effects();
        assert!(effects.contains(&FacultyEffect::LoadGroups));
        assert!(effects.contains(&FacultyEffect::LoadStudents));
    }

    #[test]
    fn assignment_failure_reloads_students_only() {
        let mut panel = loaded_panel();
        panel.apply(&ApiEvent::StudentAssigned(Err("no such group".to_string())));
        let effects = panel.take_effects();
        assert!(effects.contains(&FacultyEffect::LoadStudents));
        assert!(!effects.contains(&FacultyEffect::LoadGroups));
        assert!(effects.iter().any(|e| matches!(e, FacultyEffect::Toast(_))));
    }

    #[test]
    fn load_failure_keeps_cached_groups() {
        let mut panel = loaded_panel();
        panel.apply(&ApiEvent::Groups(Err("connection refused".to_string())));
        assert_eq!(panel.groups.len(), 2);
    }

    #[test]
    fn student_events_are_not_for_this_panel() {
        let mut panel = loaded_panel();
        assert!(!panel.apply(&ApiEvent::Question(Err("nope".to_string()))));
    }
}
