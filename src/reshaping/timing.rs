/*!
 * Timing reconciliation for one batch.
 *
 * The service only reports when a subtitle starts and when its last word
 * starts. End times are derived here from those two values and the start of
 * the following subtitle.
 */

use super::response::CandidateSubtitle;
use crate::subtitle_processor::{SUBTITLE_GAP_MS, Subtitle};

/// Reading time granted after the last word starts
pub const LAST_WORD_DISPLAY_MS: u64 = 1500;

/// Shortest span the reconciler will emit
pub const MIN_DURATION_MS: u64 = 1000;

/// Compute final spans for the candidates of one batch, in order.
///
/// Only neighbours within the batch are considered; seams between batches
/// are handled by `SubtitleTrack::finalize`.
pub fn reconcile_batch(candidates: &[CandidateSubtitle]) -> Vec<Subtitle> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let next_start = candidates.get(i + 1).map(|next| next.start_ms);
            Subtitle::new(
                candidate.start_ms,
                end_time(candidate, next_start),
                candidate.text.clone(),
            )
        })
        .collect()
}

fn end_time(candidate: &CandidateSubtitle, next_start_ms: Option<u64>) -> u64 {
    // 0 means "unknown" until a neighbour or the minimum fills it in
    let mut end_ms = if candidate.last_word_ms > 0 {
        candidate.last_word_ms.saturating_add(LAST_WORD_DISPLAY_MS)
    } else {
        0
    };

    if let Some(next_start_ms) = next_start_ms {
        let limit = next_start_ms.saturating_sub(SUBTITLE_GAP_MS);
        if end_ms == 0 || limit < end_ms {
            end_ms = limit;
        }
    }

    if end_ms <= candidate.start_ms || end_ms - candidate.start_ms < MIN_DURATION_MS {
        end_ms = candidate.start_ms.saturating_add(MIN_DURATION_MS);
    }

    end_ms
}
