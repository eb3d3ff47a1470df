use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::file_utils::FileManager;

// @module: Final subtitle units, track assembly and SRT/JSON output

/// Gap left between two subtitles when the earlier one has to be cut short
pub const SUBTITLE_GAP_MS: u64 = 100;

// @struct: Single subtitle span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtitle {
    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Subtitle text
    pub text: String,
}

impl Subtitle {
    pub fn new(start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        Self {
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Write this subtitle as one SRT block with the given 1-based index
    pub fn write_srt_block(&self, f: &mut impl fmt::Write, index: usize) -> fmt::Result {
        writeln!(f, "{}", index)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_ms),
            Self::format_timestamp(self.end_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered subtitle track, assembled batch by batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    /// Subtitles in display order
    pub entries: Vec<Subtitle>,
}

impl SubtitleTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the reconciled subtitles of one batch
    pub fn append_batch(&mut self, subtitles: Vec<Subtitle>) {
        self.entries.extend(subtitles);
    }

    /// Global monotonicity pass over the concatenated batches.
    ///
    /// Whenever a subtitle runs past the start of the next one, its end is pulled
    /// back to leave a `SUBTITLE_GAP_MS` gap. Minimum duration is not re-checked
    /// here, so a clamped entry may end up shorter than one second or even
    /// end before it starts.
    pub fn finalize(&mut self) {
        for i in 1..self.entries.len() {
            let next_start = self.entries[i].start_ms;
            let previous = &mut self.entries[i - 1];
            if previous.end_ms > next_start {
                debug!(
                    "Clamping subtitle ending at {} to next start {} - {}ms",
                    previous.end_ms, next_start, SUBTITLE_GAP_MS
                );
                previous.end_ms = next_start.saturating_sub(SUBTITLE_GAP_MS);
            }
        }
    }

    /// Render the whole track as SRT text
    pub fn to_srt_string(&self) -> String {
        self.to_string()
    }

    /// Render the whole track as a pretty-printed JSON array
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.entries).context("Failed to serialize subtitles to JSON")
    }

    /// Write subtitles to an SRT file
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FileManager::write_to_file(path, &self.to_srt_string())
    }

    /// Write subtitles to a JSON file
    pub fn write_to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        FileManager::write_to_file(path, &self.to_json_string()?)
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, subtitle) in self.entries.iter().enumerate() {
            subtitle.write_srt_block(f, i + 1)?;
        }
        Ok(())
    }
}

impl From<Vec<Subtitle>> for SubtitleTrack {
    fn from(entries: Vec<Subtitle>) -> Self {
        Self { entries }
    }
}
