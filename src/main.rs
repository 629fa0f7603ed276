//! codequest-desk: CodeQuest desktop client
//!
//! A GPU-rendered client for the CodeQuest coding-education server. Students
//! open a question, pick a language, and edit/run/submit code under an
//! optional exam focus guard; faculty manage student groups. Rendering is
//! vello/wgpu, HTTP goes through reqwest on a tokio runtime, and all UI flow
//! is driven by statig state machines fed from the frame loop.

mod api;
mod draft;
mod editor;
mod faculty;
mod feedback;
mod logging;
mod particles;
mod paths;
mod protocol;
mod screens;
mod state_machine;
mod text;
mod theme;

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use statig::prelude::*;
use tracing::{info, warn};
use vello::util::{RenderContext, RenderSurface};
use vello::{AaConfig, Renderer, RendererOptions, Scene};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::{Fullscreen, Window};

use vello::wgpu;

use api::{ApiClient, ApiEvent, ApiHandle};
use draft::{AutosaveTimer, DraftStore};
use editor::CodeBuffer;
use faculty::{FacultyEffect, GroupPanel, PanelFocus};
use feedback::{RunView, SubmissionView};
use protocol::Language;
use state_machine::focus_sm::{
    self, FocusEffect, FocusEvent, FocusMachine, State as FocusState,
};
use state_machine::workspace_sm::{
    State as WsState, WorkspaceEffect, WorkspaceEvent, WorkspaceMachine,
};
use text::TextContext;
use theme::ThemeController;

const TOAST_LIFETIME: Duration = Duration::from_secs(4);

/// CodeQuest desktop client
#[derive(Parser, Debug)]
#[command(name = "codequest-desk", version, about = "CodeQuest desktop client")]
struct Args {
    /// CodeQuest server root URL
    #[arg(short, long, default_value = "http://localhost:8000")]
    server: String,

    /// Which side of the app to open
    #[arg(short, long, value_enum, default_value_t = Role::Student)]
    role: Role,

    /// Start in windowed mode instead of fullscreen
    #[arg(short, long)]
    windowed: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Student,
    Faculty,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
        }
    }
}

#[derive(Debug)]
enum RenderState {
    Active {
        surface: Box<RenderSurface<'static>>,
        valid_surface: bool,
        window: Arc<Window>,
    },
    Suspended(Option<Arc<Window>>),
}

struct App {
    context: RenderContext,
    renderers: Vec<Option<Renderer>>,
    state: RenderState,
    scene: Scene,
    windowed: bool,
    role: Role,

    text: TextContext,
    theme: ThemeController,
    field: particles::ParticleField,
    toasts: Vec<(String, Instant)>,
    modifiers: ModifiersState,
    clipboard: Option<arboard::Clipboard>,

    api: ApiHandle,
    api_rx: Receiver<ApiEvent>,

    workspace: StateMachine<WorkspaceMachine>,
    focus: StateMachine<FocusMachine>,
    panel: GroupPanel,

    // Outboxes the machines fill through their dispatch context; pump()
    // drains them once per frame.
    ws_effects: Vec<WorkspaceEffect>,
    focus_effects: Vec<FocusEffect>,

    // Editable UI state. The machine wrappers only hand out shared
    // references to their storage, so everything the key handlers mutate
    // directly lives here.
    code: CodeBuffer,
    question_input: String,
    lang_cursor: usize,

    drafts: DraftStore,
    autosave: AutosaveTimer,
}

impl App {
    fn push_toast(&mut self, msg: String) {
        self.toasts.push((msg, Instant::now()));
    }

    fn dispatch_workspace(&mut self, event: WorkspaceEvent) {
        self.workspace
            .handle_with_context(&event, &mut self.ws_effects);
    }

    fn dispatch_focus(&mut self, event: FocusEvent) {
        self.focus
            .handle_with_context(&event, &mut self.focus_effects);
    }

    fn focus_active(&self) -> bool {
        focus_sm::is_active(self.focus.state())
    }

    fn in_editor(&self) -> bool {
        matches!(
            self.workspace.state(),
            WsState::EditorIdle {} | WsState::EditorRunning {} | WsState::EditorSubmitting {}
        )
    }

    fn save_current_draft(&mut self, announce: bool) {
        let Some(question) = self.workspace.question.clone() else {
            return;
        };
        match self.drafts.save(question.id, self.code.text()) {
            Ok(()) => {
                self.autosave.reset();
                if announce {
                    self.push_toast("Draft saved.".to_string());
                }
            }
            Err(e) => {
                warn!(target: "draft", "save failed: {e:#}");
                self.push_toast("Could not save draft.".to_string());
            }
        }
    }

    /// Drain completions and effect queues. Runs once per frame before
    /// drawing; `window` is needed for the fullscreen effects.
    fn pump(&mut self, window: &Window) {
        while let Ok(event) = self.api_rx.try_recv() {
            if self.panel.apply(&event) {
                continue;
            }
            let ws_event = match event {
                ApiEvent::Question(Ok(q)) => WorkspaceEvent::QuestionLoaded(q),
                ApiEvent::Question(Err(msg)) => WorkspaceEvent::QuestionLoadFailed(msg),
                ApiEvent::RunResult(Ok(report)) => {
                    WorkspaceEvent::RunFinished(RunView::from_report(&report))
                }
                ApiEvent::RunResult(Err(msg)) => WorkspaceEvent::RunFailed(msg),
                ApiEvent::SubmitResult(Ok(resp)) => {
                    if !resp.message.is_empty() {
                        self.push_toast(resp.message.clone());
                    }
                    WorkspaceEvent::SubmitFinished(SubmissionView::from_report(&resp.result))
                }
                ApiEvent::SubmitResult(Err(msg)) => WorkspaceEvent::SubmitFailed(msg),
                other => {
                    warn!(target: "api", "unrouted api event: {other:?}");
                    continue;
                }
            };
            self.dispatch_workspace(ws_event);
        }

        for effect in std::mem::take(&mut self.ws_effects) {
            match effect {
                WorkspaceEffect::LoadQuestion(id) => self.api.fetch_question(id),
                WorkspaceEffect::RunCode {
                    code,
                    language,
                    input,
                    expected,
                } => self.api.run_code(code, language, input, expected),
                WorkspaceEffect::SubmitCode {
                    question_id,
                    code,
                    language,
                } => self.api.submit(question_id, code, language),
                WorkspaceEffect::RestoreDraft(id) => match self.drafts.load(id) {
                    Some(saved) => {
                        self.code.set_text(saved);
                        self.push_toast("Draft restored.".to_string());
                    }
                    None => self.code.clear(),
                },
                WorkspaceEffect::ClearDraft(id) => self.drafts.clear(id),
                WorkspaceEffect::ResetBuffer => self.code.clear(),
                WorkspaceEffect::ExitFocusMode => {
                    self.dispatch_focus(FocusEvent::ForceEnd);
                }
                WorkspaceEffect::Toast(msg) => self.push_toast(msg),
            }
        }

        for effect in std::mem::take(&mut self.focus_effects) {
            match effect {
                FocusEffect::RequestFullscreen => {
                    window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                }
                FocusEffect::ReleaseFullscreen => {
                    if self.windowed {
                        window.set_fullscreen(None);
                    }
                }
                FocusEffect::Toast(msg) => self.push_toast(msg),
            }
        }

        for effect in self.panel.take_effects() {
            match effect {
                FacultyEffect::LoadGroups => self.api.fetch_groups(),
                FacultyEffect::LoadStudents => self.api.fetch_students(),
                FacultyEffect::CreateGroup(name) => self.api.create_group(name),
                FacultyEffect::Assign {
                    student_id,
                    group_id,
                } => self.api.assign_student(student_id, group_id),
                FacultyEffect::Toast(msg) => self.push_toast(msg),
            }
        }

        if self.in_editor() && self.autosave.due(Instant::now()) {
            self.save_current_draft(false);
        }

        let now = Instant::now();
        self.toasts
            .retain(|(_, born)| now.duration_since(*born) < TOAST_LIFETIME);

        self.field.step();
    }

    // ------------------------------------------------------------------
    // Keyboard routing
    // ------------------------------------------------------------------

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let ctrl = self.modifiers.control_key() || self.modifiers.super_key();
        let shift = self.modifiers.shift_key();

        // The exam guard sees every key before normal routing.
        if self.focus_active() {
            let key_name = match &event.logical_key {
                Key::Character(c) => Some(c.as_str()),
                Key::Named(NamedKey::F12) => Some("F12"),
                _ => None,
            };
            if let Some(name) = key_name {
                if let Some(blocked) = focus_sm::blocked_shortcut(ctrl, shift, name) {
                    self.dispatch_focus(FocusEvent::ShortcutBlocked(blocked));
                    return;
                }
                if ctrl && !shift && matches!(name.to_ascii_lowercase().as_str(), "c" | "v" | "x") {
                    self.dispatch_focus(FocusEvent::ClipboardBlocked);
                    return;
                }
            }
        }

        // Exit confirmation dialog swallows everything but its answers.
        if matches!(self.focus.state(), FocusState::ConfirmingExit {}) {
            match &event.logical_key {
                Key::Character(c) if c.as_str().eq_ignore_ascii_case("y") => {
                    self.dispatch_focus(FocusEvent::ExitConfirmed);
                }
                Key::Character(c) if c.as_str().eq_ignore_ascii_case("n") => {
                    self.dispatch_focus(FocusEvent::ExitCancelled);
                }
                Key::Named(NamedKey::Escape) => {
                    self.dispatch_focus(FocusEvent::ExitCancelled);
                }
                _ => {}
            }
            return;
        }

        // Global bindings.
        match &event.logical_key {
            Key::Named(NamedKey::F2) => {
                let pref = self.theme.toggle();
                info!(target: "theme", "theme toggled to {pref:?}");
                return;
            }
            Key::Named(NamedKey::F10) => {
                if self.focus_active() {
                    self.dispatch_focus(FocusEvent::ExitRequested);
                } else if self.in_editor() {
                    self.dispatch_focus(FocusEvent::Begin);
                }
                return;
            }
            Key::Named(NamedKey::Escape) => {
                if self.focus_active() {
                    self.dispatch_focus(FocusEvent::ExitRequested);
                    return;
                }
                match self.workspace.state().clone() {
                    WsState::EditorIdle {}
                    | WsState::EditorRunning {}
                    | WsState::EditorSubmitting {} => {
                        self.save_current_draft(false);
                        self.dispatch_workspace(WorkspaceEvent::BackToLanguages);
                    }
                    WsState::LanguagePicker {} => {
                        self.dispatch_workspace(WorkspaceEvent::BackToQuestions);
                    }
                    _ => event_loop.exit(),
                }
                return;
            }
            _ => {}
        }

        match self.role {
            Role::Faculty => self.on_faculty_key(event),
            Role::Student => self.on_student_key(event, ctrl, shift),
        }
    }

    fn on_faculty_key(&mut self, event: &KeyEvent) {
        match &event.logical_key {
            Key::Named(NamedKey::Tab) => self.panel.toggle_focus(),
            Key::Named(NamedKey::Backspace) => self.panel.backspace(),
            Key::Named(NamedKey::Enter) => match self.panel.focus {
                PanelFocus::NameInput => self.panel.submit_name(),
                PanelFocus::StudentTable => self.panel.assign_selected(),
            },
            Key::Named(NamedKey::ArrowUp) => self.panel.move_row(-1),
            Key::Named(NamedKey::ArrowDown) => self.panel.move_row(1),
            Key::Named(NamedKey::ArrowLeft) => self.panel.cycle_choice(false),
            Key::Named(NamedKey::ArrowRight) => self.panel.cycle_choice(true),
            Key::Named(NamedKey::Space) => self.panel.type_char(' '),
            Key::Character(c) => {
                for ch in c.chars() {
                    self.panel.type_char(ch);
                }
            }
            _ => {}
        }
    }

    fn on_student_key(&mut self, event: &KeyEvent, ctrl: bool, shift: bool) {
        match self.workspace.state().clone() {
            WsState::QuestionList {} => match &event.logical_key {
                Key::Named(NamedKey::Enter) => {
                    if let Ok(id) = self.question_input.parse::<i64>() {
                        self.question_input.clear();
                        self.dispatch_workspace(WorkspaceEvent::QuestionSelected(id));
                    }
                }
                Key::Named(NamedKey::Backspace) => {
                    self.question_input.pop();
                }
                Key::Character(c) => {
                    for ch in c.chars().filter(|ch| ch.is_ascii_digit()) {
                        self.question_input.push(ch);
                    }
                }
                _ => {}
            },
            WsState::LoadingQuestion { .. } => {}
            WsState::LanguagePicker {} => match &event.logical_key {
                Key::Named(NamedKey::ArrowLeft) => {
                    self.lang_cursor = self.lang_cursor.saturating_sub(1);
                }
                Key::Named(NamedKey::ArrowRight) => {
                    self.lang_cursor = (self.lang_cursor + 1).min(Language::ALL.len() - 1);
                }
                Key::Named(NamedKey::Enter) => {
                    let lang = Language::ALL[self.lang_cursor];
                    self.dispatch_workspace(WorkspaceEvent::LanguageSelected(lang));
                }
                _ => {}
            },
            WsState::EditorIdle {} | WsState::EditorRunning {} | WsState::EditorSubmitting {} => {
                self.on_editor_key(event, ctrl, shift);
            }
        }
    }

    fn on_editor_key(&mut self, event: &KeyEvent, ctrl: bool, shift: bool) {
        if ctrl {
            match &event.logical_key {
                Key::Named(NamedKey::Enter) if shift => {
                    let code = self.code.text().to_string();
                    self.dispatch_workspace(WorkspaceEvent::SubmitRequested { code });
                }
                Key::Named(NamedKey::Enter) => {
                    let code = self.code.text().to_string();
                    self.dispatch_workspace(WorkspaceEvent::RunRequested { code });
                }
                Key::Character(c) if c.as_str().eq_ignore_ascii_case("d") => {
                    self.save_current_draft(true);
                }
                Key::Character(c) if c.as_str().eq_ignore_ascii_case("s") => {
                    // Reaches here only outside focus mode.
                    self.save_current_draft(true);
                }
                Key::Character(c) if c.as_str().eq_ignore_ascii_case("v") => {
                    let pasted = self
                        .clipboard
                        .as_mut()
                        .and_then(|cb| cb.get_text().ok());
                    if let Some(pasted) = pasted {
                        self.code.insert_str(&pasted);
                    }
                }
                Key::Character(c) if c.as_str().eq_ignore_ascii_case("c") => {
                    let code = self.code.text().to_string();
                    if let Some(cb) = self.clipboard.as_mut() {
                        if let Err(e) = cb.set_text(code) {
                            warn!(target: "editor", "clipboard write failed: {e}");
                        }
                    }
                }
                _ => {}
            }
            return;
        }

        match &event.logical_key {
            Key::Named(NamedKey::Enter) => self.code.newline(),
            Key::Named(NamedKey::Backspace) => self.code.backspace(),
            Key::Named(NamedKey::Tab) => self.code.insert_char('\t'),
            Key::Named(NamedKey::Space) => self.code.insert_char(' '),
            Key::Named(NamedKey::ArrowLeft) => self.code.move_left(),
            Key::Named(NamedKey::ArrowRight) => self.code.move_right(),
            Key::Named(NamedKey::ArrowUp) => self.code.move_up(),
            Key::Named(NamedKey::ArrowDown) => self.code.move_down(),
            Key::Named(NamedKey::Home) => self.code.move_line_start(),
            Key::Named(NamedKey::End) => self.code.move_line_end(),
            Key::Character(c) => {
                for ch in c.chars() {
                    self.code.insert_char(ch);
                }
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    fn draw_frame(&mut self, width: f64, height: f64) {
        let pal = self.theme.palette();
        let focus_active = self.focus_active();
        let warning_up = matches!(self.focus.state(), FocusState::Warning {});
        let dialog_up = matches!(self.focus.state(), FocusState::ConfirmingExit {});
        let scene = &mut self.scene;

        screens::draw_background(scene, width, height, &pal, &self.field);
        screens::draw_header(
            scene,
            &self.text,
            &pal,
            width,
            self.role.label(),
            self.theme.preference(),
        );

        match self.role {
            Role::Faculty => {
                screens::draw_faculty(scene, &self.text, &pal, width, height, &self.panel);
            }
            Role::Student => match self.workspace.state() {
                WsState::QuestionList {} => screens::draw_question_list(
                    scene,
                    &self.text,
                    &pal,
                    width,
                    height,
                    &self.question_input,
                    None,
                ),
                WsState::LoadingQuestion { id } => screens::draw_question_list(
                    scene,
                    &self.text,
                    &pal,
                    width,
                    height,
                    "",
                    Some(*id),
                ),
                WsState::LanguagePicker {} => screens::draw_language_picker(
                    scene,
                    &self.text,
                    &pal,
                    width,
                    height,
                    self.workspace.question.as_ref(),
                    self.lang_cursor,
                ),
                editor_state => {
                    let busy = match editor_state {
                        WsState::EditorRunning {} => Some("Running..."),
                        WsState::EditorSubmitting {} => Some("Submitting..."),
                        _ => None,
                    };
                    if let (Some(question), Some(language)) =
                        (&self.workspace.question, self.workspace.language)
                    {
                        let view = screens::EditorView {
                            question,
                            language,
                            code: &self.code,
                            run_view: self.workspace.run_view.as_ref(),
                            submission: self.workspace.submission.as_ref(),
                            busy,
                            focus_active,
                        };
                        screens::draw_editor(scene, &self.text, &pal, width, height, &view);
                    }
                }
            },
        }

        if warning_up {
            screens::draw_focus_warning(scene, &self.text, &pal, width);
        }
        if dialog_up {
            screens::draw_exit_dialog(scene, &self.text, &pal, width, height);
        }

        let toasts: Vec<String> = self.toasts.iter().map(|(msg, _)| msg.clone()).collect();
        screens::draw_toasts(scene, &self.text, &pal, width, height, &toasts);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let RenderState::Suspended(cached_window) = &mut self.state else {
            return;
        };

        let window = cached_window
            .take()
            .unwrap_or_else(|| create_window(event_loop, self.windowed));

        let size = window.inner_size();
        self.field.resize(size.width as f64, size.height as f64);

        let surface_future = self.context.create_surface(
            window.clone(),
            size.width,
            size.height,
            wgpu::PresentMode::AutoVsync,
        );
        let surface = pollster::block_on(surface_future).expect("Error creating surface");

        self.renderers
            .resize_with(self.context.devices.len(), || None);
        self.renderers[surface.dev_id]
            .get_or_insert_with(|| create_renderer(&self.context, &surface));

        self.state = RenderState::Active {
            surface: Box::new(surface),
            valid_surface: true,
            window,
        };
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let RenderState::Active { window, .. } = &self.state {
            self.state = RenderState::Suspended(Some(window.clone()));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let window = match &self.state {
            RenderState::Active { window, .. } if window.id() == window_id => window.clone(),
            _ => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }

            WindowEvent::KeyboardInput {
                event:
                    key_event @ KeyEvent {
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.on_key(event_loop, &key_event);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.field.set_mouse(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.field.clear_mouse();
            }

            WindowEvent::Focused(has_focus) => {
                if self.focus_active() {
                    let guard_event = if has_focus {
                        FocusEvent::WindowVisible
                    } else {
                        FocusEvent::WindowHidden
                    };
                    self.dispatch_focus(guard_event);
                }
            }
            WindowEvent::Occluded(hidden) => {
                if self.focus_active() {
                    let guard_event = if hidden {
                        FocusEvent::WindowHidden
                    } else {
                        FocusEvent::WindowVisible
                    };
                    self.dispatch_focus(guard_event);
                }
            }

            WindowEvent::Resized(size) => {
                let RenderState::Active {
                    surface,
                    valid_surface,
                    ..
                } = &mut self.state
                else {
                    return;
                };
                if size.width != 0 && size.height != 0 {
                    self.context.resize_surface(surface, size.width, size.height);
                    *valid_surface = true;
                    self.field.resize(size.width as f64, size.height as f64);
                } else {
                    *valid_surface = false;
                }
            }

            WindowEvent::RedrawRequested => {
                self.pump(&window);

                let RenderState::Active {
                    surface,
                    valid_surface,
                    ..
                } = &mut self.state
                else {
                    return;
                };
                if !*valid_surface {
                    return;
                }

                let width = surface.config.width as f64;
                let height = surface.config.height as f64;
                let base_color = self.theme.palette().background;

                self.scene.reset();
                let surface = match &mut self.state {
                    RenderState::Active { surface, .. } => surface,
                    _ => return,
                };
                let dev_id = surface.dev_id;
                self.draw_frame(width, height);

                let surface = match &self.state {
                    RenderState::Active { surface, .. } => surface,
                    _ => return,
                };
                let device_handle = &self.context.devices[dev_id];

                if let Some(renderer) = self.renderers[dev_id].as_mut() {
                    if let Err(e) = renderer.render_to_texture(
                        &device_handle.device,
                        &device_handle.queue,
                        &self.scene,
                        &surface.target_view,
                        &vello::RenderParams {
                            base_color,
                            width: surface.config.width,
                            height: surface.config.height,
                            antialiasing_method: AaConfig::Msaa16,
                        },
                    ) {
                        warn!(target: "render", "render failed: {e}");
                        return;
                    }
                }

                let surface_texture = match surface.surface.get_current_texture() {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(target: "render", "no surface texture: {e}");
                        return;
                    }
                };

                let mut encoder =
                    device_handle
                        .device
                        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("Surface Blit"),
                        });
                surface.blitter.copy(
                    &device_handle.device,
                    &mut encoder,
                    &surface.target_view,
                    &surface_texture
                        .texture
                        .create_view(&wgpu::TextureViewDescriptor::default()),
                );
                device_handle.queue.submit([encoder.finish()]);
                surface_texture.present();
                if let Err(e) = device_handle.device.poll(wgpu::PollType::Poll) {
                    warn!(target: "render", "device poll failed: {e:?}");
                }

                // Request another frame for continuous updates.
                window.request_redraw();
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let app_paths = paths::AppPaths::resolve().context("HOME is not set")?;
    app_paths.ensure()?;
    let _log_guard = logging::init(Some(&app_paths.logs));

    info!(
        "codequest-desk v{} connecting to {} as {}",
        env!("CARGO_PKG_VERSION"),
        args.server,
        args.role.label()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;

    let client = Arc::new(ApiClient::new(&args.server)?);
    let (api_tx, api_rx) = std::sync::mpsc::sync_channel::<ApiEvent>(32);
    let api = ApiHandle::new(client, runtime.handle().clone(), api_tx);

    let mut theme = ThemeController::load(app_paths.theme_file());
    theme.watch();

    let mut panel = GroupPanel::new();
    if args.role == Role::Faculty {
        panel.init();
    }

    let mut app = App {
        context: RenderContext::new(),
        renderers: vec![],
        state: RenderState::Suspended(None),
        scene: Scene::new(),
        windowed: args.windowed,
        role: args.role,
        text: TextContext::load(),
        theme,
        field: particles::ParticleField::new(1280.0, 800.0),
        toasts: Vec::new(),
        modifiers: ModifiersState::default(),
        clipboard: arboard::Clipboard::new().ok(),
        api,
        api_rx,
        workspace: WorkspaceMachine::new().state_machine(),
        focus: FocusMachine::new().state_machine(),
        panel,
        ws_effects: Vec::new(),
        focus_effects: Vec::new(),
        code: CodeBuffer::new(),
        question_input: String::new(),
        lang_cursor: 0,
        drafts: DraftStore::new(app_paths.drafts.clone()),
        autosave: AutosaveTimer::new(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app).context("event loop failed")?;

    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}

fn create_window(event_loop: &ActiveEventLoop, windowed: bool) -> Arc<Window> {
    let mut attr = Window::default_attributes().with_title("codequest-desk | CodeQuest");

    if !windowed {
        attr = attr.with_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        attr = attr.with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
    }

    Arc::new(event_loop.create_window(attr).expect("create window"))
}

fn create_renderer(render_cx: &RenderContext, surface: &RenderSurface<'_>) -> Renderer {
    Renderer::new(
        &render_cx.devices[surface.dev_id].device,
        RendererOptions::default(),
    )
    .expect("Couldn't create renderer")
}
