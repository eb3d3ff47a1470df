/*!
 * Batch planning over the global word sequence.
 *
 * Batches are at most `max_batch_size` words. The next batch does not start at
 * `start + max_batch_size` but at the word id where the service says its last
 * subtitle begins, so an unfinished trailing sentence is handed to the next
 * batch instead of being cut in half.
 */

use log::warn;

/// Default number of words sent in one request
pub const DEFAULT_MAX_BATCH_SIZE: usize = 300;

/// A contiguous slice `[start_index, end_index)` of the word sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// 1-based batch counter, used in logs and debug file names
    pub number: usize,
    pub start_index: usize,
    pub end_index: usize,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the batch may start mid-sentence
    pub fn is_continuation(&self) -> bool {
        self.start_index > 0
    }

    pub fn contains(&self, word_id: usize) -> bool {
        (self.start_index..self.end_index).contains(&word_id)
    }
}

/// Result of finishing one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchAdvance {
    /// Words before this index were consumed by the finished batch
    pub consumed_end: usize,
    /// Next batch to process, if any
    pub next: Option<Batch>,
}

/// Plans successive batches from the declared stopping point of each response
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    total_words: usize,
    max_batch_size: usize,
}

impl BatchPlanner {
    pub fn new(total_words: usize, max_batch_size: usize) -> Self {
        Self {
            total_words,
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// First batch, or `None` for an empty sequence
    pub fn first(&self) -> Option<Batch> {
        self.batch_at(1, 0)
    }

    /// Decide where the next batch starts.
    ///
    /// `declared_stop` is the `st_id` of the last candidate returned for `batch`,
    /// or `None` when the service returned no candidates.
    pub fn advance(&self, batch: &Batch, declared_stop: Option<usize>) -> BatchAdvance {
        if batch.len() < self.max_batch_size {
            return BatchAdvance {
                consumed_end: batch.end_index,
                next: None,
            };
        }

        let next_start = match declared_stop {
            Some(stop) if stop > batch.start_index => stop.min(batch.end_index),
            Some(stop) => {
                warn!(
                    "Batch {} declared stop {} does not move past its start {}, advancing a full batch",
                    batch.number, stop, batch.start_index
                );
                batch.end_index
            }
            None => {
                warn!(
                    "Batch {} returned no subtitles, advancing a full batch",
                    batch.number
                );
                batch.end_index
            }
        };

        match self.batch_at(batch.number + 1, next_start) {
            Some(next) => BatchAdvance {
                consumed_end: next.start_index,
                next: Some(next),
            },
            None => BatchAdvance {
                consumed_end: batch.end_index,
                next: None,
            },
        }
    }

    fn batch_at(&self, number: usize, start_index: usize) -> Option<Batch> {
        if start_index >= self.total_words {
            return None;
        }
        Some(Batch {
            number,
            start_index,
            end_index: (start_index + self.max_batch_size).min(self.total_words),
        })
    }
}
