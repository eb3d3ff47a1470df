/*!
 * Subtitle reshaping: regrouping word timings into readable subtitle blocks.
 *
 * - `planner`: batch windows over the word sequence
 * - `prompts`: prompt text for one batch
 * - `response`: decoding and validating the service's answer
 * - `timing`: end-time reconciliation within a batch
 * - `debug`: per-batch debug artifacts
 * - `core`: the sequential batch loop tying it all together
 */

pub mod core;
pub mod debug;
pub mod planner;
pub mod prompts;
pub mod response;
pub mod timing;

pub use self::core::{BatchOutcome, ReshapingService};
pub use debug::DebugArtifacts;
pub use planner::{Batch, BatchAdvance, BatchPlanner, DEFAULT_MAX_BATCH_SIZE};
pub use prompts::BatchPromptBuilder;
pub use response::{CandidateSubtitle, parse_batch_response, strip_code_fences};
pub use timing::reconcile_batch;
