//! Local draft persistence for the student editor.
//!
//! One plain-text file per question under the data directory, written by the
//! 8-second autosave tick and the explicit save binding, removed when the
//! student leaves the question or submits successfully.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::debug;

pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(8);

pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, question_id: i64) -> PathBuf {
        self.dir.join(format!("question_{question_id}.txt"))
    }

    /// Returns the saved draft for a question, or `None` if there is none.
    pub fn load(&self, question_id: i64) -> Option<String> {
        let path = self.path_for(question_id);
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                debug!(target: "draft", "restored {} bytes from {}", text.len(), path.display());
                Some(text)
            }
            Err(_) => None,
        }
    }

    pub fn save(&self, question_id: i64, code: &str) -> Result<()> {
        let path = self.path_for(question_id);
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating draft dir {}", self.dir.display()))?;
        std::fs::write(&path, code)
            .with_context(|| format!("writing draft {}", path.display()))?;
        debug!(target: "draft", "saved {} bytes to {}", code.len(), path.display());
        Ok(())
    }

    /// Removes the draft for a question. Missing files are not an error.
    pub fn clear(&self, question_id: i64) {
        let path = self.path_for(question_id);
        if remove_if_present(&path) {
            debug!(target: "draft", "cleared {}", path.display());
        }
    }
}

fn remove_if_present(path: &Path) -> bool {
    std::fs::remove_file(path).is_ok()
}

/// Frame-polled autosave clock. `due()` fires once per interval whether or
/// not the buffer changed; an unchanged write is just overwritten in place.
/// Explicit saves call `reset()` so the next tick starts from them.
pub struct AutosaveTimer {
    last_tick: Instant,
}

impl AutosaveTimer {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_tick) >= AUTOSAVE_INTERVAL {
            self.last_tick = now;
            true
        } else {
            false
        }
    }
}

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self::new()
    }
}
