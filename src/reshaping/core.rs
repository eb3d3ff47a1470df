/*!
 * Core reshaping service.
 *
 * Drives the sequential batch loop: plan a batch, ask the provider to regroup
 * its words, reconcile the returned timings, and append the result to the
 * track. Each batch's start depends on the previous response, so batches are
 * never processed concurrently.
 */

use std::sync::Arc;

use log::{debug, info};

use super::debug::DebugArtifacts;
use super::planner::{Batch, BatchPlanner};
use super::prompts::BatchPromptBuilder;
use super::response::{CandidateSubtitle, parse_batch_response};
use super::timing::reconcile_batch;
use crate::app_config::Config;
use crate::errors::{AppError, ExtractionError, ReshapeError, ServiceError};
use crate::language_utils;
use crate::providers::Provider;
use crate::subtitle_processor::{Subtitle, SubtitleTrack};
use crate::timedtext::WordTiming;

/// Decoded and reconciled result of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Candidates as returned by the service
    pub candidates: Vec<CandidateSubtitle>,
    /// Reconciled spans, one per candidate
    pub subtitles: Vec<Subtitle>,
}

impl BatchOutcome {
    /// Reconcile `candidates` into an outcome
    pub fn from_candidates(candidates: Vec<CandidateSubtitle>) -> Self {
        let subtitles = reconcile_batch(&candidates);
        Self { candidates, subtitles }
    }

    /// Word id where the service says the last subtitle starts
    pub fn declared_stop(&self) -> Option<usize> {
        self.candidates.last().map(|c| c.start_word_id)
    }

    /// Subtitles starting before `consumed_end`; later ones are redone by the next batch
    pub fn into_subtitles(self, consumed_end: usize) -> Vec<Subtitle> {
        self.candidates
            .iter()
            .zip(self.subtitles)
            .filter(|(candidate, _)| candidate.start_word_id < consumed_end)
            .map(|(_, subtitle)| subtitle)
            .collect()
    }
}

/// Service that turns a word sequence into a finished subtitle track
#[derive(Debug, Clone)]
pub struct ReshapingService {
    /// Provider answering the reshaping requests
    provider: Arc<dyn Provider>,

    /// Prompt builder
    prompts: BatchPromptBuilder,

    /// Maximum number of words per batch
    max_batch_size: usize,

    /// Debug artifact writer
    debug: DebugArtifacts,
}

impl ReshapingService {
    /// Create a new reshaping service
    pub fn new(provider: Arc<dyn Provider>, prompts: BatchPromptBuilder, max_batch_size: usize) -> Self {
        Self {
            provider,
            prompts,
            max_batch_size,
            debug: DebugArtifacts::disabled(),
        }
    }

    /// Create a service from the application configuration
    pub fn from_config(provider: Arc<dyn Provider>, config: &Config) -> Result<Self, AppError> {
        let language_line = language_utils::describe_languages(&config.reshaping.languages)
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self::new(
            provider,
            BatchPromptBuilder::new(language_line),
            config.reshaping.max_batch_size,
        )
        .with_debug(DebugArtifacts::from_config(&config.debug)))
    }

    /// Set the debug artifact writer
    pub fn with_debug(mut self, debug: DebugArtifacts) -> Self {
        self.debug = debug;
        self
    }

    /// Reshape `words` into a finished track
    pub async fn reshape(&self, words: &[WordTiming]) -> Result<SubtitleTrack, AppError> {
        self.reshape_with_progress(words, |_, _| {}).await
    }

    /// Reshape `words`, reporting `(words consumed, total words)` after each batch.
    ///
    /// `words[i].id` must equal `i`, as produced by the extractor.
    pub async fn reshape_with_progress(
        &self,
        words: &[WordTiming],
        progress: impl Fn(usize, usize),
    ) -> Result<SubtitleTrack, AppError> {
        if words.is_empty() {
            return Err(ExtractionError::Empty.into());
        }

        let planner = BatchPlanner::new(words.len(), self.max_batch_size);
        let mut track = SubtitleTrack::new();
        let mut current = planner.first();

        while let Some(batch) = current {
            info!(
                "Processing batch {}: words {} to {} (total: {})",
                batch.number,
                batch.start_index,
                batch.end_index - 1,
                batch.len()
            );

            let outcome = self
                .process_batch(&batch, &words[batch.start_index..batch.end_index])
                .await
                .map_err(|e| AppError::batch(batch.number, e))?;

            let advance = planner.advance(&batch, outcome.declared_stop());
            let subtitles = outcome.into_subtitles(advance.consumed_end);
            self.debug.write_subtitles(batch.number, &subtitles);
            track.append_batch(subtitles);

            progress(advance.consumed_end, words.len());
            current = advance.next;
        }

        track.finalize();
        Ok(track)
    }

    /// Send one batch to the provider and reconcile the answer
    pub async fn process_batch(
        &self,
        batch: &Batch,
        words: &[WordTiming],
    ) -> Result<BatchOutcome, ReshapeError> {
        let prompt = self.prompts.build(batch, words)?;
        self.debug.write_prompt(batch.number, &prompt);

        let raw_body = match self.provider.complete(&prompt).await {
            Ok(body) => body,
            Err(e) => {
                if let ServiceError::Api { body, .. } = &e {
                    self.debug.write_response(batch.number, body);
                }
                return Err(e.into());
            }
        };
        self.debug.write_response(batch.number, &raw_body);

        let text = self.provider.extract_text(&raw_body)?;
        let outcome = BatchOutcome::from_candidates(parse_batch_response(&text, batch)?);

        debug!(
            "Batch {}: Processed {} words into {} subtitles (last word index: {})",
            batch.number,
            batch.len(),
            outcome.subtitles.len(),
            outcome.declared_stop().unwrap_or(batch.start_index)
        );

        Ok(outcome)
    }
}
