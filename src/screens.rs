//! Screen rendering using vello.
//!
//! One function per screen plus shared chrome (header, toasts, overlays).
//! Everything draws from immutable snapshots; no screen function mutates
//! state or performs IO.

use vello::Scene;
use vello::kurbo::{Affine, Circle, Line, Point, Rect, RoundedRect, Stroke};
use vello::peniko::Fill;

use crate::editor::CodeBuffer;
use crate::faculty::{GroupPanel, PanelFocus};
use crate::feedback::{RunView, SubmissionView, Verdict};
use crate::particles::{AccentHue, ParticleField};
use crate::protocol::{Language, Question};
use crate::text::TextContext;
use crate::theme::{Palette, ThemePreference};

// --- Layout constants ---

const MARGIN: f64 = 24.0;
const PANEL_PADDING: f64 = 16.0;
const HEADER_HEIGHT: f64 = 56.0;
const LINE_HEIGHT: f64 = 26.0;
const CORNER_RADIUS: f64 = 8.0;
const CODE_SIZE: f32 = 15.0;
const BODY_SIZE: f32 = 15.0;
const TITLE_SIZE: f32 = 22.0;

// ---------------------------------------------------------------------------
// Background and chrome
// ---------------------------------------------------------------------------

/// Background fill plus the particle layer. Drawn first every frame.
pub fn draw_background(scene: &mut Scene, width: f64, height: f64, pal: &Palette, field: &ParticleField) {
    let bg = Rect::new(0.0, 0.0, width, height);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.background, None, &bg);

    for (i, j, strength) in field.connections() {
        let a = &field.particles()[i];
        let b = &field.particles()[j];
        let mut color = pal.accent;
        color.components[3] = (strength * 0.35) as f32;
        let line = Line::new(Point::new(a.x, a.y), Point::new(b.x, b.y));
        scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, color, None, &line);
    }

    for p in field.particles() {
        let mut color = match p.hue {
            AccentHue::Violet => pal.accent,
            AccentHue::Cyan => pal.accent_alt,
        };
        color.components[3] = 0.6;
        let dot = Circle::new(Point::new(p.x, p.y), p.radius);
        scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &dot);
    }
}

/// Title bar: app name, role, theme indicator with its toggle binding.
pub fn draw_header(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    width: f64,
    role_label: &str,
    theme: ThemePreference,
) {
    let bar = Rect::new(0.0, 0.0, width, HEADER_HEIGHT);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.header, None, &bar);

    text.draw_line(scene, MARGIN, 36.0, "CODEQUEST", pal.text_primary, TITLE_SIZE);
    let title_w = text.measure("CODEQUEST", TITLE_SIZE);
    text.draw_line(scene, MARGIN + title_w + 16.0, 36.0, role_label, pal.text_secondary, BODY_SIZE);

    let indicator = format!("[F2] {}", theme.glyph_label());
    let w = text.measure(&indicator, BODY_SIZE);
    text.draw_line(scene, width - MARGIN - w, 36.0, &indicator, pal.accent_alt, BODY_SIZE);
}

/// Bottom-right toast stack, newest at the bottom.
pub fn draw_toasts(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    width: f64,
    height: f64,
    toasts: &[String],
) {
    let mut y = height - MARGIN;
    for msg in toasts.iter().rev() {
        let w = text.measure(msg, BODY_SIZE) + 2.0 * PANEL_PADDING;
        let rect = RoundedRect::new(width - MARGIN - w, y - 34.0, width - MARGIN, y, CORNER_RADIUS);
        scene.fill(Fill::NonZero, Affine::IDENTITY, pal.panel, None, &rect);
        scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, pal.accent, None, &rect);
        text.draw_line(
            scene,
            width - MARGIN - w + PANEL_PADDING,
            y - 12.0,
            msg,
            pal.text_primary,
            BODY_SIZE,
        );
        y -= 42.0;
    }
}

fn panel(scene: &mut Scene, pal: &Palette, rect: Rect) {
    let rounded = RoundedRect::from_rect(rect, CORNER_RADIUS);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.panel, None, &rounded);
    scene.stroke(&Stroke::new(1.5), Affine::IDENTITY, pal.panel_border, None, &rounded);
}

fn section_header(scene: &mut Scene, text: &TextContext, pal: &Palette, x: f64, y: f64, title: &str) -> f64 {
    text.draw_line(scene, x, y, title, pal.text_secondary, 13.0);
    y + LINE_HEIGHT
}

// ---------------------------------------------------------------------------
// Student screens
// ---------------------------------------------------------------------------

/// Question list screen: a number entry for the question id.
pub fn draw_question_list(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    width: f64,
    height: f64,
    input: &str,
    loading: Option<i64>,
) {
    let box_w = 420.0;
    let box_h = 170.0;
    let x = (width - box_w) / 2.0;
    let y = (height - box_h) / 2.0;
    panel(scene, pal, Rect::new(x, y, x + box_w, y + box_h));

    let inner_x = x + PANEL_PADDING;
    let mut cy = y + PANEL_PADDING + 20.0;
    text.draw_line(scene, inner_x, cy, "Open a question", pal.text_primary, TITLE_SIZE);
    cy += LINE_HEIGHT + 10.0;

    if let Some(id) = loading {
        text.draw_line(scene, inner_x, cy, &format!("Loading question {id}..."), pal.text_secondary, BODY_SIZE);
        return;
    }

    text.draw_line(scene, inner_x, cy, "Question id, then Enter:", pal.text_secondary, BODY_SIZE);
    cy += LINE_HEIGHT + 6.0;

    let field = RoundedRect::new(inner_x, cy - 20.0, inner_x + 160.0, cy + 8.0, 4.0);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.editor_bg, None, &field);
    scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, pal.accent, None, &field);
    let shown = if input.is_empty() { "_" } else { input };
    text.draw_mono(scene, inner_x + 8.0, cy, shown, pal.text_primary, BODY_SIZE);
}

/// Language picker: four cards, arrows to move, Enter to pick.
pub fn draw_language_picker(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    width: f64,
    height: f64,
    question: Option<&Question>,
    cursor: usize,
) {
    let mut cy = HEADER_HEIGHT + MARGIN + 20.0;
    if let Some(q) = question {
        text.draw_line(scene, MARGIN, cy, &q.title, pal.text_primary, TITLE_SIZE);
        let meta = format!("{} | {} marks", q.difficulty, q.marks);
        cy += LINE_HEIGHT;
        text.draw_line(scene, MARGIN, cy, &meta, pal.text_secondary, 13.0);
        cy += LINE_HEIGHT;
    }

    cy = section_header(scene, text, pal, MARGIN, cy + 10.0, "CHOOSE A LANGUAGE");

    let card_w = (width - 2.0 * MARGIN - 3.0 * 16.0) / 4.0;
    let card_h = (height * 0.25).min(160.0);
    for (i, lang) in Language::ALL.iter().enumerate() {
        let x = MARGIN + i as f64 * (card_w + 16.0);
        let rect = Rect::new(x, cy, x + card_w, cy + card_h);
        panel(scene, pal, rect);
        if i == cursor {
            let hl = RoundedRect::from_rect(rect, CORNER_RADIUS);
            scene.stroke(&Stroke::new(3.0), Affine::IDENTITY, pal.accent, None, &hl);
        }
        let name = lang.display_name();
        let w = text.measure(name, TITLE_SIZE);
        text.draw_line(
            scene,
            x + (card_w - w) / 2.0,
            cy + card_h / 2.0 + 8.0,
            name,
            pal.text_primary,
            TITLE_SIZE,
        );
    }

    let hint = "Enter: open editor    Esc: back to questions";
    text.draw_line(scene, MARGIN, cy + card_h + LINE_HEIGHT + 6.0, hint, pal.text_secondary, 13.0);
}

/// Editor screen input snapshot.
pub struct EditorView<'a> {
    pub question: &'a Question,
    pub language: Language,
    pub code: &'a CodeBuffer,
    pub run_view: Option<&'a RunView>,
    pub submission: Option<&'a SubmissionView>,
    /// "Running..." / "Submitting..." while a request is in flight.
    pub busy: Option<&'a str>,
    pub focus_active: bool,
}

/// Main editor: question panel on the left, code in the middle, results
/// below the code.
pub fn draw_editor(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    width: f64,
    height: f64,
    view: &EditorView<'_>,
) {
    let top = HEADER_HEIGHT + MARGIN;
    let side_w = (width * 0.28).min(360.0);
    let main_x = MARGIN + side_w + 16.0;

    // --- Question panel ---
    let side = Rect::new(MARGIN, top, MARGIN + side_w, height - MARGIN);
    panel(scene, pal, side);
    let inner_x = MARGIN + PANEL_PADDING;
    let inner_w = side_w - 2.0 * PANEL_PADDING;
    let mut cy = top + PANEL_PADDING + 18.0;
    text.draw_line(scene, inner_x, cy, &view.question.title, pal.text_primary, 18.0);
    cy += LINE_HEIGHT;
    let meta = format!(
        "{} | {} marks | {}",
        view.question.difficulty,
        view.question.marks,
        view.language.display_name()
    );
    text.draw_line(scene, inner_x, cy, &meta, pal.text_secondary, 13.0);
    cy += LINE_HEIGHT;
    cy = text.draw_wrapped(scene, inner_x, cy, inner_w, &view.question.description, pal.text_primary, 14.0);
    if !view.question.constraints.is_empty() {
        cy = section_header(scene, text, pal, inner_x, cy + 6.0, "CONSTRAINTS");
        cy = text.draw_wrapped(scene, inner_x, cy, inner_w, &view.question.constraints, pal.text_secondary, 13.0);
    }
    if !view.question.example_input.is_empty() {
        cy = section_header(scene, text, pal, inner_x, cy + 6.0, "EXAMPLE");
        text.draw_mono(scene, inner_x, cy, &format!("in:  {}", view.question.example_input), pal.text_secondary, 13.0);
        cy += LINE_HEIGHT * 0.8;
        text.draw_mono(scene, inner_x, cy, &format!("out: {}", view.question.example_output), pal.text_secondary, 13.0);
    }

    // --- Code panel ---
    let results_h = (height * 0.30).min(260.0);
    let code_bottom = height - MARGIN - results_h - 12.0;
    let code_rect = Rect::new(main_x, top, width - MARGIN, code_bottom);
    let rounded = RoundedRect::from_rect(code_rect, CORNER_RADIUS);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.editor_bg, None, &rounded);
    scene.stroke(&Stroke::new(1.5), Affine::IDENTITY, pal.panel_border, None, &rounded);

    let code_x = main_x + PANEL_PADDING;
    let mut line_y = top + PANEL_PADDING + 14.0;
    let code_line_h = CODE_SIZE as f64 * 1.5;
    let visible = ((code_rect.height() - 2.0 * PANEL_PADDING) / code_line_h) as usize;
    let (cursor_line, cursor_col) = view.code.cursor_line_col();
    let first = cursor_line.saturating_sub(visible.saturating_sub(1));
    for (i, line) in view.code.lines().enumerate().skip(first).take(visible) {
        text.draw_mono(scene, code_x, line_y, line, pal.text_primary, CODE_SIZE);
        if i == cursor_line {
            let cx = code_x + cursor_col as f64 * text.mono_advance(CODE_SIZE);
            let caret = Rect::new(cx, line_y - CODE_SIZE as f64, cx + 2.0, line_y + 3.0);
            scene.fill(Fill::NonZero, Affine::IDENTITY, pal.accent, None, &caret);
        }
        line_y += code_line_h;
    }

    // --- Results panel ---
    let res_rect = Rect::new(main_x, code_bottom + 12.0, width - MARGIN, height - MARGIN);
    panel(scene, pal, res_rect);
    let rx = main_x + PANEL_PADDING;
    let rw = res_rect.width() - 2.0 * PANEL_PADDING;
    let mut ry = code_bottom + 12.0 + PANEL_PADDING + 12.0;

    if let Some(label) = view.busy {
        text.draw_line(scene, rx, ry, label, pal.text_secondary, BODY_SIZE);
    } else if let Some(sub) = view.submission {
        draw_submission(scene, text, pal, rx, ry, rw, sub);
    } else if let Some(run) = view.run_view {
        draw_run(scene, text, pal, rx, ry, rw, run);
    } else {
        let hints = if view.focus_active {
            "Ctrl+Enter: run    Ctrl+Shift+Enter: submit    F10: end focus mode"
        } else {
            "Ctrl+Enter: run    Ctrl+Shift+Enter: submit    Ctrl+D: save draft    F10: focus mode    Esc: back"
        };
        text.draw_line(scene, rx, ry, hints, pal.text_secondary, 13.0);
        ry += LINE_HEIGHT;
        text.draw_line(scene, rx, ry, "Results will appear here.", pal.text_secondary, BODY_SIZE);
    }
}

fn verdict_color(pal: &Palette, verdict: Verdict) -> vello::peniko::Color {
    match verdict {
        Verdict::Passed => pal.ok,
        Verdict::Partial => pal.warn,
        Verdict::Failed => pal.err,
    }
}

fn draw_submission(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    x: f64,
    mut y: f64,
    w: f64,
    sub: &SubmissionView,
) {
    let color = verdict_color(pal, sub.verdict);
    let headline = format!("{}  {:.2}%", sub.verdict.label(), sub.score);
    text.draw_line(scene, x, y, &headline, color, 18.0);
    let counts = format!("{}/{} tests passed", sub.passed, sub.total);
    let cw = text.measure(&counts, BODY_SIZE);
    text.draw_line(scene, x + w - cw, y, &counts, pal.text_secondary, BODY_SIZE);
    y += LINE_HEIGHT * 0.7;
    text.draw_line(scene, x, y, &sub.submitted_label(), pal.text_secondary, 13.0);
    y += 12.0;

    // Score bar.
    let bar = RoundedRect::new(x, y, x + w, y + 10.0, 5.0);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.bar_bg, None, &bar);
    let fill_w = w * (sub.score / 100.0).clamp(0.0, 1.0);
    if fill_w > 1.0 {
        let fill = RoundedRect::new(x, y, x + fill_w, y + 10.0, 5.0);
        scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &fill);
    }
    y += LINE_HEIGHT;

    for line in sub.feedback.iter().take(4) {
        y = text.draw_wrapped(scene, x, y, w, line, pal.text_primary, 13.0);
    }
    if sub.feedback.len() > 4 {
        text.draw_line(
            scene,
            x,
            y,
            &format!("+{} more", sub.feedback.len() - 4),
            pal.text_secondary,
            13.0,
        );
    }
}

fn draw_run(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    x: f64,
    mut y: f64,
    w: f64,
    run: &RunView,
) {
    let (label, color) = if run.is_correct {
        ("Output matched", pal.ok)
    } else {
        ("Output did not match", pal.err)
    };
    text.draw_line(scene, x, y, label, color, 18.0);
    y += LINE_HEIGHT;

    if !run.error.is_empty() {
        y = text.draw_wrapped(scene, x, y, w, &run.error, pal.err, 13.0);
    } else if !run.output.is_empty() {
        text.draw_mono(scene, x, y, &truncate(&run.output, 120), pal.text_primary, 13.0);
        y += LINE_HEIGHT;
    }
    if let Some(feedback) = &run.feedback {
        text.draw_wrapped(scene, x, y, w, feedback, pal.text_secondary, 13.0);
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    let line = s.lines().next().unwrap_or("");
    let mut out: String = line.chars().take(max_chars).collect();
    if line.chars().count() > max_chars || s.lines().count() > 1 {
        out.push_str("...");
    }
    out
}

// ---------------------------------------------------------------------------
// Focus mode overlays
// ---------------------------------------------------------------------------

/// Red banner across the top while the exam window was hidden.
pub fn draw_focus_warning(scene: &mut Scene, text: &TextContext, pal: &Palette, width: f64) {
    let bar = Rect::new(0.0, HEADER_HEIGHT, width, HEADER_HEIGHT + 36.0);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.banner, None, &bar);
    let msg = "You left the exam window. Return to the editor and stay here.";
    let w = text.measure(msg, BODY_SIZE);
    text.draw_line(scene, (width - w) / 2.0, HEADER_HEIGHT + 24.0, msg, pal.text_primary, BODY_SIZE);
}

/// Modal confirmation for ending focus mode.
pub fn draw_exit_dialog(scene: &mut Scene, text: &TextContext, pal: &Palette, width: f64, height: f64) {
    let mut dim = pal.background;
    dim.components[3] = 0.7;
    let full = Rect::new(0.0, 0.0, width, height);
    scene.fill(Fill::NonZero, Affine::IDENTITY, dim, None, &full);

    let box_w = 440.0;
    let box_h = 130.0;
    let x = (width - box_w) / 2.0;
    let y = (height - box_h) / 2.0;
    panel(scene, pal, Rect::new(x, y, x + box_w, y + box_h));

    text.draw_line(scene, x + PANEL_PADDING, y + 40.0, "End Focus Mode?", pal.text_primary, TITLE_SIZE);
    text.draw_line(
        scene,
        x + PANEL_PADDING,
        y + 72.0,
        "Leaving the exam will be recorded.",
        pal.text_secondary,
        BODY_SIZE,
    );
    text.draw_line(scene, x + PANEL_PADDING, y + 104.0, "[Y] end exam    [N] keep working", pal.accent_alt, BODY_SIZE);
}

// ---------------------------------------------------------------------------
// Faculty screen
// ---------------------------------------------------------------------------

/// Group cards on the left, student table on the right.
pub fn draw_faculty(
    scene: &mut Scene,
    text: &TextContext,
    pal: &Palette,
    width: f64,
    height: f64,
    view: &GroupPanel,
) {
    let top = HEADER_HEIGHT + MARGIN;
    let left_w = (width - 2.0 * MARGIN - 16.0) * 0.45;
    let right_x = MARGIN + left_w + 16.0;

    // --- Groups column ---
    let left = Rect::new(MARGIN, top, MARGIN + left_w, height - MARGIN);
    panel(scene, pal, left);
    let inner_x = MARGIN + PANEL_PADDING;
    let inner_w = left_w - 2.0 * PANEL_PADDING;
    let mut cy = top + PANEL_PADDING + 18.0;
    text.draw_line(scene, inner_x, cy, "Groups", pal.text_primary, TITLE_SIZE);
    cy += LINE_HEIGHT + 6.0;

    // Create form.
    let field = RoundedRect::new(inner_x, cy - 18.0, inner_x + inner_w, cy + 8.0, 4.0);
    scene.fill(Fill::NonZero, Affine::IDENTITY, pal.editor_bg, None, &field);
    let border = if view.focus == PanelFocus::NameInput {
        pal.accent
    } else {
        pal.panel_border
    };
    scene.stroke(&Stroke::new(1.5), Affine::IDENTITY, border, None, &field);
    let shown = if view.name_input.is_empty() && view.focus != PanelFocus::NameInput {
        "New group name..."
    } else {
        &view.name_input
    };
    text.draw_line(scene, inner_x + 8.0, cy, shown, pal.text_primary, BODY_SIZE);
    cy += LINE_HEIGHT + 10.0;

    if view.loading {
        text.draw_line(scene, inner_x, cy, "Loading...", pal.text_secondary, BODY_SIZE);
    } else if view.groups.is_empty() {
        text.draw_line(scene, inner_x, cy, "No groups yet.", pal.text_secondary, BODY_SIZE);
    }
    for group in &view.groups {
        let card_h = LINE_HEIGHT + 8.0 + LINE_HEIGHT * 0.8 * group.students.len().min(4) as f64;
        let card = Rect::new(inner_x, cy - 14.0, inner_x + inner_w, cy - 14.0 + card_h);
        let rounded = RoundedRect::from_rect(card, 6.0);
        scene.stroke(&Stroke::new(1.0), Affine::IDENTITY, pal.panel_border, None, &rounded);
        text.draw_line(scene, inner_x + 8.0, cy + 4.0, &group.name, pal.text_primary, BODY_SIZE);
        let count = format!("{} students", group.student_count);
        let cw = text.measure(&count, 13.0);
        text.draw_line(scene, inner_x + inner_w - cw - 8.0, cy + 4.0, &count, pal.text_secondary, 13.0);
        let mut sy = cy + 4.0 + LINE_HEIGHT * 0.8;
        if group.students.is_empty() {
            text.draw_line(scene, inner_x + 16.0, sy, "empty", pal.text_secondary, 12.0);
        }
        for member in group.students.iter().take(4) {
            text.draw_line(scene, inner_x + 16.0, sy, &member.username, pal.text_secondary, 12.0);
            sy += LINE_HEIGHT * 0.8;
        }
        cy += card_h + 10.0;
    }

    // --- Students column ---
    let right = Rect::new(right_x, top, width - MARGIN, height - MARGIN);
    panel(scene, pal, right);
    let rx = right_x + PANEL_PADDING;
    let rw = right.width() - 2.0 * PANEL_PADDING;
    let mut ry = top + PANEL_PADDING + 18.0;
    text.draw_line(scene, rx, ry, "Students", pal.text_primary, TITLE_SIZE);
    ry += LINE_HEIGHT + 6.0;

    if view.students.is_empty() && !view.loading {
        text.draw_line(scene, rx, ry, "No students yet.", pal.text_secondary, BODY_SIZE);
    }
    for (i, student) in view.students.iter().enumerate() {
        let selected = i == view.row && view.focus == PanelFocus::StudentTable;
        if selected {
            let hl = Rect::new(rx - 6.0, ry - 18.0, rx + rw + 6.0, ry + 8.0);
            let mut color = pal.accent;
            color.components[3] = 0.18;
            scene.fill(Fill::NonZero, Affine::IDENTITY, color, None, &hl);
        }
        text.draw_line(scene, rx, ry, &student.username, pal.text_primary, BODY_SIZE);

        let group_label = if selected {
            format!("< {} >", view.choice_label())
        } else {
            student.group_name.clone().unwrap_or_else(|| "Unassigned".to_string())
        };
        let gw = text.measure(&group_label, BODY_SIZE);
        let color = if selected { pal.accent_alt } else { pal.text_secondary };
        text.draw_line(scene, rx + rw - gw, ry, &group_label, color, BODY_SIZE);
        ry += LINE_HEIGHT;
    }

    let hint = "Tab: switch column    Up/Down: student    Left/Right: group    Enter: apply";
    text.draw_line(scene, rx, height - MARGIN - 10.0, hint, pal.text_secondary, 12.0);
}
