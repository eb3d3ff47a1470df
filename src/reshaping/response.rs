/*!
 * Decoding of the reshaping service's answer.
 *
 * The model is asked for a bare JSON array but frequently wraps it in a
 * Markdown code fence. The text is unwrapped, parsed as a whole, and then
 * checked against the batch it answers; nothing is salvaged from a response
 * that fails any of those steps.
 */

use serde::{Deserialize, Serialize};

use super::planner::Batch;
use crate::errors::ResponseFormatError;

/// One subtitle proposed by the service, before end times are known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSubtitle {
    /// Global id of the first word in the subtitle
    #[serde(rename = "st_id")]
    pub start_word_id: usize,

    /// Start time of the first word
    #[serde(rename = "st_ms")]
    pub start_ms: u64,

    /// Start time of the last word
    #[serde(rename = "lw_ms")]
    pub last_word_ms: u64,

    pub text: String,

    /// Set by the service when the sentence runs past the batch
    #[serde(default)]
    pub incomplete: bool,
}

/// Remove an optional ```` ```json ```` / ```` ``` ```` fence around the payload
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };

    match inner.rfind("```") {
        Some(end) => inner[..end].trim(),
        None => inner.trim(),
    }
}

/// Parse the generated text into candidates
pub fn decode_candidates(text: &str) -> Result<Vec<CandidateSubtitle>, ResponseFormatError> {
    let payload = strip_code_fences(text);
    serde_json::from_str::<Vec<CandidateSubtitle>>(payload).map_err(|e| {
        ResponseFormatError::InvalidJson {
            message: e.to_string(),
            raw: payload.to_string(),
        }
    })
}

/// Check that candidates only reference words of `batch`, in non-decreasing order
pub fn validate_candidates(
    candidates: &[CandidateSubtitle],
    batch: &Batch,
    raw: &str,
) -> Result<(), ResponseFormatError> {
    let invalid = |reason: String| ResponseFormatError::InvalidCandidates {
        reason,
        raw: raw.to_string(),
    };

    for (i, candidate) in candidates.iter().enumerate() {
        if !batch.contains(candidate.start_word_id) {
            return Err(invalid(format!(
                "subtitle {} starts at word {} outside batch range [{}, {})",
                i, candidate.start_word_id, batch.start_index, batch.end_index
            )));
        }
        if let Some(previous) = i.checked_sub(1).map(|p| &candidates[p]) {
            if candidate.start_word_id < previous.start_word_id {
                return Err(invalid(format!(
                    "subtitle {} starts at word {} before previous subtitle's word {}",
                    i, candidate.start_word_id, previous.start_word_id
                )));
            }
        }
    }

    Ok(())
}

/// Decode and validate the generated text for `batch`
pub fn parse_batch_response(
    text: &str,
    batch: &Batch,
) -> Result<Vec<CandidateSubtitle>, ResponseFormatError> {
    let candidates = decode_candidates(text)?;
    validate_candidates(&candidates, batch, strip_code_fences(text))?;
    Ok(candidates)
}
