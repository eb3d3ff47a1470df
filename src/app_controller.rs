use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, OutputFormat};
use crate::errors::AppError;
use crate::file_utils::{FileManager, FileType, TIMED_TEXT_EXTENSION};
use crate::providers::Provider;
use crate::providers::gemini::Gemini;
use crate::reshaping::ReshapingService;
use crate::subtitle_processor::SubtitleTrack;
use crate::timedtext;

// @module: Application controller for srv3 conversion

/// What happened to a single input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The file was converted and the output written
    Converted {
        output: PathBuf,
        words: usize,
        subtitles: usize,
    },
    /// The output already existed and overwriting was not requested
    Skipped { output: PathBuf },
}

/// Counts for a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Build the provider described by the configuration
    fn build_provider(&self) -> Result<Arc<dyn Provider>> {
        let gemini = Gemini::from_config(&self.config.reshaping)
            .context("Failed to create Gemini client")?;
        debug!("Using {} model {}", gemini.name(), gemini.model());
        Ok(Arc::new(gemini))
    }

    /// Convert a single srv3 file
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<RunOutcome> {
        let provider = self.build_provider()?;
        self.run_with_provider(provider, input_file, output_file, force_overwrite)
            .await
    }

    /// Convert a single srv3 file using `provider`
    pub async fn run_with_provider(
        &self,
        provider: Arc<dyn Provider>,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<RunOutcome> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(provider, &input_file, output_file, &multi_progress, force_overwrite)
            .await
    }

    /// Run the conversion with progress reporting
    async fn run_with_progress(
        &self,
        provider: Arc<dyn Provider>,
        input_file: &Path,
        output_file: Option<PathBuf>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<RunOutcome> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        Self::check_input_type(input_file)?;

        let output_format = self.config.output_format;
        let output_path = output_file
            .unwrap_or_else(|| FileManager::output_path(input_file, output_format.extension()));

        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, output already exists (use -f to force overwrite)",
                input_file
            );
            return Ok(RunOutcome::Skipped { output: output_path });
        }

        info!("Converting {:?}", input_file);

        let words = timedtext::load_word_timings(input_file)
            .map_err(AppError::from)
            .with_context(|| format!("Failed to extract words from {:?}", input_file))?;
        debug!("Extracted {} words", words.len());

        let service = ReshapingService::from_config(provider, &self.config)?;

        let progress_bar = multi_progress.add(ProgressBar::new(words.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%)"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let result = service
            .reshape_with_progress(&words, |consumed, _total| {
                progress_bar.set_position(consumed as u64);
            })
            .await;

        let track = match result {
            Ok(track) => {
                progress_bar.finish_and_clear();
                track
            }
            Err(e) => {
                progress_bar.abandon();
                return Err(e).with_context(|| format!("Failed to convert {:?}", input_file));
            }
        };

        Self::write_track(&track, &output_path, output_format)?;

        info!(
            "Successfully processed {} words into {} subtitle blocks",
            words.len(),
            track.len()
        );
        info!(
            "Success: {} ({})",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunOutcome::Converted {
            output: output_path,
            words: words.len(),
            subtitles: track.len(),
        })
    }

    /// Single-file mode only accepts `.srv3` inputs
    fn check_input_type(input_file: &Path) -> Result<()> {
        if FileManager::has_timed_text_extension(input_file) {
            return Ok(());
        }

        match FileManager::detect_file_type(input_file)? {
            FileType::Subtitle => Err(anyhow!(
                "Input is already an SRT subtitle file: {:?}",
                input_file
            )),
            FileType::TimedText => Err(anyhow!(
                "Input looks like timed text but must have the .{} extension: {:?}",
                TIMED_TEXT_EXTENSION,
                input_file
            )),
            FileType::Unknown => Err(anyhow!(
                "Input file must have the .{} extension: {:?}",
                TIMED_TEXT_EXTENSION,
                input_file
            )),
        }
    }

    /// Write the finished track in the requested format
    fn write_track(track: &SubtitleTrack, output_path: &Path, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Srt => track.write_to_srt(output_path),
            OutputFormat::Json => track.write_to_json(output_path),
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Convert every srv3 file under `input_dir`
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderSummary> {
        let provider = self.build_provider()?;
        self.run_folder_with_provider(provider, input_dir, force_overwrite)
            .await
    }

    /// Convert every srv3 file under `input_dir` using `provider`.
    ///
    /// A failing file is logged and the run continues; the result is an error
    /// when at least one file failed.
    pub async fn run_folder_with_provider(
        &self,
        provider: Arc<dyn Provider>,
        input_dir: PathBuf,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let input_files = FileManager::find_files(&input_dir, TIMED_TEXT_EXTENSION)?;
        if input_files.is_empty() {
            return Err(anyhow!("No .{} files found in directory: {:?}", TIMED_TEXT_EXTENSION, input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(input_files.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style.progress_chars("█▓▒░"));

        let mut summary = FolderSummary::default();

        for input_file in &input_files {
            let file_name = input_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self
                .run_with_progress(provider.clone(), input_file, None, &multi_progress, force_overwrite)
                .await
            {
                Ok(RunOutcome::Converted { .. }) => summary.converted += 1,
                Ok(RunOutcome::Skipped { .. }) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} converted, {} skipped, {} errors ({})",
            summary.converted,
            summary.skipped,
            summary.failed,
            Self::format_duration(start_time.elapsed())
        );

        if summary.failed > 0 {
            return Err(anyhow!(
                "{} of {} files failed to convert",
                summary.failed,
                input_files.len()
            ));
        }

        Ok(summary)
    }
}
