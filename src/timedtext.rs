/*!
 * Timed-text (srv3) extraction.
 *
 * YouTube's auto-generated captions in srv3 format carry one `<p>` per caption
 * line and one `<s>` per recognised word, each `<s>` offset relative to its
 * paragraph. This module flattens that into an ordered list of `WordTiming`.
 */

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::ExtractionError;

const FILEPATH_ANNOTATION: &str = "// filepath:";
const ROOT_TAG_OPEN: &str = "<timedtext";

/// A single recognised word with its absolute start time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordTiming {
    /// Global index of the word in the transcript
    pub id: usize,

    /// The trimmed word text
    pub word: String,

    /// Absolute start time in milliseconds
    pub start_ms: u64,
}

/// One `<s>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub offset_ms: u64,
    pub text: String,
}

/// One `<p>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub offset_ms: u64,
    pub fragments: Vec<Fragment>,
}

/// Parsed timed-text document, reduced to what extraction needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimedTextDocument {
    pub paragraphs: Vec<Paragraph>,
}

impl TimedTextDocument {
    /// Parse an srv3 document.
    ///
    /// Offsets that are missing or not a non-negative integer are read as 0.
    pub fn parse(content: &str) -> Result<Self, ExtractionError> {
        let content = strip_filepath_annotation(content)
            .trim_start_matches('\u{feff}')
            .trim_start();
        let document = roxmltree::Document::parse(content)
            .map_err(|e| ExtractionError::Xml(e.to_string()))?;

        let root = document.root_element();
        if root.tag_name().name() != "timedtext" {
            return Err(ExtractionError::UnexpectedRoot(root.tag_name().name().to_string()));
        }

        let Some(body) = root.children().find(|n| n.has_tag_name("body")) else {
            debug!("Timed-text document has no <body>");
            return Ok(Self::default());
        };

        let paragraphs = body
            .children()
            .filter(|n| n.has_tag_name("p"))
            .map(|p| Paragraph {
                offset_ms: parse_offset(p.attribute("t")),
                fragments: p
                    .children()
                    .filter(|n| n.has_tag_name("s"))
                    .map(|s| Fragment {
                        offset_ms: parse_offset(s.attribute("t")),
                        text: s
                            .descendants()
                            .filter(|d| d.is_text())
                            .filter_map(|d| d.text())
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self { paragraphs })
    }

    /// Flatten the document into word timings, ids starting at 0 in document order
    pub fn word_timings(&self) -> Vec<WordTiming> {
        let mut words = Vec::new();

        for paragraph in self.paragraphs.iter().filter(|p| !p.fragments.is_empty()) {
            for fragment in &paragraph.fragments {
                let word = fragment.text.trim();
                if word.is_empty() {
                    continue;
                }

                words.push(WordTiming {
                    id: words.len(),
                    word: word.to_string(),
                    start_ms: paragraph.offset_ms.saturating_add(fragment.offset_ms),
                });
            }
        }

        words
    }
}

/// Parse a document and extract its words, failing when there are none
pub fn extract_word_timings(content: &str) -> Result<Vec<WordTiming>, ExtractionError> {
    let words = TimedTextDocument::parse(content)?.word_timings();
    if words.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(words)
}

/// Read an srv3 file and extract its words
pub fn load_word_timings<P: AsRef<Path>>(path: P) -> Result<Vec<WordTiming>, ExtractionError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    extract_word_timings(&content)
}

// Some saved captions carry an editor annotation line ahead of the root
// element, possibly after the XML declaration. Everything up to and including
// that line is dropped. Lines from the root element on are never touched.
fn strip_filepath_annotation(content: &str) -> &str {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.contains(ROOT_TAG_OPEN) {
            break;
        }
        offset += line.len();
        if line.contains(FILEPATH_ANNOTATION) {
            return &content[offset..];
        }
    }
    content
}

fn parse_offset(raw: Option<&str>) -> u64 {
    match raw {
        None => 0,
        Some(value) => value.trim().parse::<u64>().unwrap_or_else(|_| {
            debug!("Ignoring malformed time offset {:?}, using 0", value);
            0
        }),
    }
}
