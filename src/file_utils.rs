use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

/// Extension of YouTube timed-text (format 3) documents
pub const TIMED_TEXT_EXTENSION: &str = "srv3";

// @const: Bytes read when sniffing a file's content
const SNIFF_LEN: u64 = 1024;

static TIMED_TEXT_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(?://[^\n]*\n\s*)?(?:<\?xml[^>]*\?>\s*)?<timedtext\b")
        .unwrap_or_else(|e| panic!("invalid timed-text pattern: {}", e))
});

static SRT_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+\s*\r?\n\d{2}:\d{2}:\d{2},\d{3}\s+-->\s+\d{2}:\d{2}:\d{2},\d{3}")
        .unwrap_or_else(|e| panic!("invalid SRT pattern: {}", e))
});

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Default output path: the input path with its extension replaced
    pub fn output_path<P: AsRef<Path>>(input_file: P, extension: &str) -> PathBuf {
        input_file.as_ref().with_extension(extension)
    }

    /// Whether `path` carries the timed-text extension (case-insensitive)
    pub fn has_timed_text_extension<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(TIMED_TEXT_EXTENSION))
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Detect whether a file is a timed-text document or an SRT file.
    ///
    /// The extension decides when it is known; otherwise the head of the file
    /// is inspected.
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        if Self::has_timed_text_extension(path) {
            return Ok(FileType::TimedText);
        }
        if path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("srt"))
        {
            return Ok(FileType::Subtitle);
        }

        let mut head = String::new();
        let file = fs::File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
        // Non-UTF-8 content is simply not a text format we know
        if file.take(SNIFF_LEN).read_to_string(&mut head).is_err() {
            return Ok(FileType::Unknown);
        }

        Ok(Self::sniff(&head))
    }

    /// Classify file content by its first bytes
    pub fn sniff(head: &str) -> FileType {
        let head = head.trim_start_matches('\u{feff}');
        if TIMED_TEXT_HEAD.is_match(head) {
            FileType::TimedText
        } else if SRT_HEAD.is_match(head) {
            FileType::Subtitle
        } else {
            FileType::Unknown
        }
    }
}

/// Enum representing different file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// YouTube timed-text document (srv3)
    TimedText,
    /// Subtitle file (SRT)
    Subtitle,
    /// Unknown file type
    Unknown,
}
