/*!
 * # ytautosub - YouTube auto-captions to readable subtitles
 *
 * A Rust library that turns YouTube timed-text (srv3) auto-captions into
 * sentence-shaped SRT subtitles, using an LLM to regroup the words.
 *
 * ## Features
 *
 * - Extract word-level timings from srv3 documents
 * - Regroup words into natural subtitle blocks with Google Gemini
 * - Batch long transcripts while keeping sentences whole across batches
 * - Reconcile end times so blocks never overlap
 * - Write SRT or JSON output, single files or whole folders
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timedtext`: srv3 parsing and word extraction
 * - `reshaping`: the batch loop and its parts:
 *   - `reshaping::planner`: Batch windows over the word sequence
 *   - `reshaping::prompts`: Prompt construction
 *   - `reshaping::response`: Response decoding and validation
 *   - `reshaping::timing`: Timing reconciliation
 *   - `reshaping::core`: The sequential reshaping service
 * - `subtitle_processor`: Subtitle track assembly and SRT/JSON output
 * - `providers`: LLM clients:
 *   - `providers::gemini`: Google Gemini API client
 *   - `providers::mock`: Scripted provider for tests
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod reshaping;
pub mod subtitle_processor;
pub mod timedtext;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, FolderSummary, RunOutcome};
pub use errors::{AppError, ExtractionError, ReshapeError, ResponseFormatError, ServiceError};
pub use reshaping::ReshapingService;
pub use subtitle_processor::{Subtitle, SubtitleTrack};
pub use timedtext::{WordTiming, extract_word_timings};
