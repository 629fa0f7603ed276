//! Theme preference and color palettes.
//!
//! The original CodeQuest pages persisted a light/dark flag under two
//! different localStorage keys (`theme`, `cq_theme`). Here there is exactly
//! one persisted location: `theme.toml` in the config directory, read on
//! startup and rewritten on every toggle.
//!
//! A read or parse failure on startup degrades silently to the dark default
//! for that run — the preference file is decorative state, never worth
//! failing over.
//!
//! `theme.toml` is also hot-reloaded: a `notify` watcher on the config
//! directory re-applies hand edits without a restart.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vello::peniko::Color;

/// Persisted light/dark preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    #[default]
    Dark,
}

impl ThemePreference {
    pub fn flipped(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }

    /// Header indicator label — the desktop stand-in for the ☀️/🌙 glyph.
    pub fn glyph_label(self) -> &'static str {
        match self {
            ThemePreference::Light => "SUN",
            ThemePreference::Dark => "MOON",
        }
    }
}

/// On-disk shape of `theme.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
struct ThemeFile {
    preference: ThemePreference,
}

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

/// Every color the renderer uses, resolved for the active preference.
#[derive(Debug, Clone)]
pub struct Palette {
    pub background: Color,
    pub panel: Color,
    pub panel_border: Color,
    pub header: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    /// Violet accent — particles, selection highlights.
    pub accent: Color,
    /// Cyan accent — the second particle color, links.
    pub accent_alt: Color,
    pub ok: Color,
    pub warn: Color,
    pub err: Color,
    pub bar_bg: Color,
    pub editor_bg: Color,
    pub banner: Color,
}

/// Resolve the palette for a preference.
///
/// The accents match the CodeQuest web palette: violet #8b5cf6 and
/// cyan #06b6d4 on a near-black dark surface.
pub fn palette(pref: ThemePreference) -> Palette {
    match pref {
        ThemePreference::Dark => Palette {
            background: Color::new([0.043, 0.055, 0.102, 1.0]),
            panel: Color::new([0.086, 0.106, 0.176, 1.0]),
            panel_border: Color::new([0.25, 0.27, 0.40, 1.0]),
            header: Color::new([0.12, 0.13, 0.23, 1.0]),
            text_primary: Color::new([0.93, 0.94, 0.97, 1.0]),
            text_secondary: Color::new([0.93, 0.94, 0.97, 0.6]),
            accent: Color::new([0.545, 0.361, 0.965, 1.0]),
            accent_alt: Color::new([0.024, 0.714, 0.831, 1.0]),
            ok: Color::new([0.25, 0.75, 0.42, 1.0]),
            warn: Color::new([0.90, 0.67, 0.16, 1.0]),
            err: Color::new([0.88, 0.28, 0.25, 1.0]),
            bar_bg: Color::new([1.0, 1.0, 1.0, 0.08]),
            editor_bg: Color::new([0.055, 0.067, 0.125, 1.0]),
            banner: Color::new([0.55, 0.16, 0.14, 1.0]),
        },
        ThemePreference::Light => Palette {
            background: Color::new([0.965, 0.965, 0.98, 1.0]),
            panel: Color::new([1.0, 1.0, 1.0, 1.0]),
            panel_border: Color::new([0.78, 0.78, 0.85, 1.0]),
            header: Color::new([0.91, 0.90, 0.97, 1.0]),
            text_primary: Color::new([0.10, 0.11, 0.15, 1.0]),
            text_secondary: Color::new([0.10, 0.11, 0.15, 0.6]),
            accent: Color::new([0.455, 0.263, 0.875, 1.0]),
            accent_alt: Color::new([0.0, 0.55, 0.66, 1.0]),
            ok: Color::new([0.13, 0.55, 0.28, 1.0]),
            warn: Color::new([0.72, 0.50, 0.05, 1.0]),
            err: Color::new([0.75, 0.17, 0.15, 1.0]),
            bar_bg: Color::new([0.0, 0.0, 0.0, 0.08]),
            editor_bg: Color::new([0.94, 0.94, 0.96, 1.0]),
            banner: Color::new([0.80, 0.25, 0.22, 1.0]),
        },
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Owns the persisted preference, the backing file, and the hot-reload
/// watcher. The shell reads `preference()` every frame; edits to the file
/// from outside the process land within a frame or two.
pub struct ThemeController {
    path: PathBuf,
    current: Arc<Mutex<ThemePreference>>,
    _watcher: Option<RecommendedWatcher>,
}

impl ThemeController {
    /// Load the preference from `path`, writing a default file if missing.
    /// Does not start the watcher — call `watch()` for that.
    pub fn load(path: PathBuf) -> Self {
        ensure_default_file(&path);
        let pref = read_preference(&path).unwrap_or_default();
        Self {
            path,
            current: Arc::new(Mutex::new(pref)),
            _watcher: None,
        }
    }

    /// Start watching the theme file for external edits.
    ///
    /// Watches the *parent directory* and filters by filename: editors write
    /// to a temp file then rename, which a direct file watch would miss.
    pub fn watch(&mut self) {
        let target = match self.path.file_name() {
            Some(name) => name.to_os_string(),
            None => return,
        };
        let parent = match self.path.parent() {
            Some(p) => p.to_path_buf(),
            None => return,
        };

        let path = self.path.clone();
        let current = Arc::clone(&self.current);
        let watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(e) => e,
                Err(e) => {
                    warn!(target: "theme", "watch error: {e}");
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                return;
            }
            let affects_target = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|f| f == target).unwrap_or(false));
            if !affects_target {
                return;
            }
            if let Some(pref) = read_preference(&path) {
                let mut guard = current.lock().unwrap();
                if *guard != pref {
                    info!(target: "theme", "theme.toml changed, applying {:?}", pref);
                    *guard = pref;
                }
            }
        });

        match watcher {
            Ok(mut w) => {
                if let Err(e) = w.watch(&parent, RecursiveMode::NonRecursive) {
                    warn!(target: "theme", "failed to watch {}: {e}", parent.display());
                    return;
                }
                self._watcher = Some(w);
            }
            Err(e) => warn!(target: "theme", "failed to create theme watcher: {e}"),
        }
    }

    pub fn preference(&self) -> ThemePreference {
        *self.current.lock().unwrap()
    }

    pub fn palette(&self) -> Palette {
        palette(self.preference())
    }

    /// Flip the preference, persist it, and return the new value.
    pub fn toggle(&self) -> ThemePreference {
        let next = {
            let mut guard = self.current.lock().unwrap();
            *guard = guard.flipped();
            *guard
        };
        self.persist(next);
        next
    }

    fn persist(&self, pref: ThemePreference) {
        let file = ThemeFile { preference: pref };
        match toml::to_string_pretty(&file) {
            Ok(content) => {
                if let Err(e) = std::fs::write(&self.path, content) {
                    warn!(target: "theme", "failed to persist theme: {e}");
                }
            }
            Err(e) => warn!(target: "theme", "failed to serialize theme: {e}"),
        }
    }
}

fn read_preference(path: &Path) -> Option<ThemePreference> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<ThemeFile>(&content) {
        Ok(file) => Some(file.preference),
        Err(e) => {
            warn!(target: "theme", "ignoring malformed {}: {e}", path.display());
            None
        }
    }
}

fn ensure_default_file(path: &Path) {
    if path.exists() {
        return;
    }
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let default = "# CodeQuest theme — \"light\" or \"dark\". Toggled in-app, hand edits apply live.\npreference = \"dark\"\n";
    if let Err(e) = std::fs::write(path, default) {
        warn!(target: "theme", "failed to write default theme.toml: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_in_tempdir() -> (tempfile::TempDir, ThemeController) {
        let dir = tempfile::tempdir().expect("tempdir");
        let controller = ThemeController::load(dir.path().join("theme.toml"));
        (dir, controller)
    }

    #[test]
    fn default_is_dark() {
        let (_dir, controller) = controller_in_tempdir();
        assert_eq!(controller.preference(), ThemePreference::Dark);
    }

    #[test]
    fn double_toggle_is_idempotent() {
        let (dir, controller) = controller_in_tempdir();
        let before = controller.preference();

        controller.toggle();
        controller.toggle();

        assert_eq!(controller.preference(), before);

        // Persisted value must also have returned to the original.
        let reloaded = ThemeController::load(dir.path().join("theme.toml"));
        assert_eq!(reloaded.preference(), before);
    }

    #[test]
    fn toggle_persists_across_reload() {
        let (dir, controller) = controller_in_tempdir();
        let toggled = controller.toggle();
        assert_eq!(toggled, ThemePreference::Light);

        let reloaded = ThemeController::load(dir.path().join("theme.toml"));
        assert_eq!(reloaded.preference(), ThemePreference::Light);
    }

    #[test]
    fn malformed_file_degrades_to_dark() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("theme.toml");
        std::fs::write(&path, "this is not [[ valid toml").unwrap();

        let controller = ThemeController::load(path);
        assert_eq!(controller.preference(), ThemePreference::Dark);
    }

    #[test]
    fn glyph_labels_track_preference() {
        assert_eq!(ThemePreference::Light.glyph_label(), "SUN");
        assert_eq!(ThemePreference::Dark.glyph_label(), "MOON");
    }

    #[test]
    fn palettes_differ_by_preference() {
        let dark = palette(ThemePreference::Dark);
        let light = palette(ThemePreference::Light);
        assert_ne!(
            dark.background.components,
            light.background.components
        );
    }
}
