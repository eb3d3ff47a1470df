/*!
 * Best-effort debug artifacts.
 *
 * When enabled, every batch leaves its prompt, the raw service body and the
 * reconciled subtitles in the debug directory. A failed write is logged and
 * otherwise ignored.
 */

use std::path::PathBuf;

use log::{debug, warn};

use crate::app_config::DebugConfig;
use crate::subtitle_processor::Subtitle;

/// Writes per-batch debug files, or nothing when disabled
#[derive(Debug, Clone)]
pub struct DebugArtifacts {
    dir: Option<PathBuf>,
}

impl DebugArtifacts {
    /// Writer that never touches the filesystem
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Writer rooted at `dir`; the directory is created on first use
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: Some(dir.into()) }
    }

    pub fn from_config(config: &DebugConfig) -> Self {
        if config.enabled && !config.dir.as_os_str().is_empty() {
            Self::in_dir(&config.dir)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn write_prompt(&self, batch_number: usize, prompt: &str) {
        self.write(&format!("batch_{}_prompt.txt", batch_number), prompt);
    }

    pub fn write_response(&self, batch_number: usize, raw_body: &str) {
        self.write(&format!("batch_{}_response.json", batch_number), raw_body);
    }

    pub fn write_subtitles(&self, batch_number: usize, subtitles: &[Subtitle]) {
        if !self.is_enabled() {
            return;
        }
        match serde_json::to_string_pretty(subtitles) {
            Ok(json) => self.write(&format!("batch_{}_subtitles.json", batch_number), &json),
            Err(e) => warn!("Failed to serialize debug subtitles for batch {}: {}", batch_number, e),
        }
    }

    fn write(&self, file_name: &str, content: &str) {
        let Some(dir) = &self.dir else {
            return;
        };

        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!("Failed to create debug directory {}: {}", dir.display(), e);
            return;
        }

        let path = dir.join(file_name);
        match std::fs::write(&path, content) {
            Ok(()) => debug!("Saved {}", path.display()),
            Err(e) => warn!("Failed to save debug file {}: {}", path.display(), e),
        }
    }
}

impl Default for DebugArtifacts {
    fn default() -> Self {
        Self::disabled()
    }
}
