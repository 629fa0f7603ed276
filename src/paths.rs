//! Application directory structure for codequest-desk.
//!
//! Provides a single `AppPaths` struct that resolves all standard directories
//! and ensures they exist on first launch:
//!
//! - Config:  `~/.config/codequest-desk/`  (theme.toml lives here)
//! - Data:    platform data dir (drafts live under `drafts/`)
//! - Cache:   platform cache dir
//! - Logs:    platform log dir
//!
//! macOS uses `~/Library/...` conventions; everywhere else falls back to XDG.

use std::path::{Path, PathBuf};
use tracing::info;

#[cfg(target_os = "macos")]
const BUNDLE_ID: &str = "com.codequest.codequest-desk";
const APP_NAME: &str = "codequest-desk";

/// All resolved application directory paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Human-editable config: `~/.config/codequest-desk/`
    pub config: PathBuf,
    /// Machine-managed application data root
    pub data: PathBuf,
    /// Per-question code drafts
    pub drafts: PathBuf,
    /// Regenerable cache data
    pub cache: PathBuf,
    /// Application logs
    pub logs: PathBuf,
}

impl AppPaths {
    /// Resolve all paths from the user's home directory.
    /// Does not create any directories — call `ensure()` for that.
    pub fn resolve() -> Option<Self> {
        let home = std::env::var("HOME").ok().map(PathBuf::from)?;

        let config = resolve_config_dir(&home);
        let data = resolve_data_dir(&home);
        let cache = resolve_cache_dir(&home);
        let logs = resolve_log_dir(&home);

        Some(Self {
            config,
            drafts: data.join("drafts"),
            data,
            cache,
            logs,
        })
    }

    /// Create all directories that don't already exist.
    pub fn ensure(&self) -> std::io::Result<()> {
        let dirs = [&self.config, &self.data, &self.drafts, &self.cache, &self.logs];
        for dir in &dirs {
            std::fs::create_dir_all(dir)?;
            info!("ensured directory: {}", dir.display());
        }
        Ok(())
    }

    /// Path to the persisted theme preference file.
    pub fn theme_file(&self) -> PathBuf {
        self.config.join("theme.toml")
    }
}

// ---------------------------------------------------------------------------
// Platform-specific path resolution
// ---------------------------------------------------------------------------

fn resolve_config_dir(home: &Path) -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join(APP_NAME)
    } else {
        home.join(".config").join(APP_NAME)
    }
}

#[cfg(target_os = "macos")]
fn resolve_data_dir(home: &Path) -> PathBuf {
    home.join("Library")
        .join("Application Support")
        .join(BUNDLE_ID)
}

#[cfg(not(target_os = "macos"))]
fn resolve_data_dir(home: &Path) -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join(APP_NAME)
    } else {
        home.join(".local").join("share").join(APP_NAME)
    }
}

#[cfg(target_os = "macos")]
fn resolve_cache_dir(home: &Path) -> PathBuf {
    home.join("Library").join("Caches").join(BUNDLE_ID)
}

#[cfg(not(target_os = "macos"))]
fn resolve_cache_dir(home: &Path) -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join(APP_NAME)
    } else {
        home.join(".cache").join(APP_NAME)
    }
}

#[cfg(target_os = "macos")]
fn resolve_log_dir(home: &Path) -> PathBuf {
    home.join("Library").join("Logs").join(APP_NAME)
}

#[cfg(not(target_os = "macos"))]
fn resolve_log_dir(home: &Path) -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join(APP_NAME).join("logs")
    } else {
        home.join(".local").join("share").join(APP_NAME).join("logs")
    }
}
