/*!
 * Provider implementations for the text-reshaping service.
 *
 * - Gemini: Google Generative Language API (`generateContent`)
 * - Mock: scripted replies in the Gemini wire format, for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::{ResponseFormatError, ServiceError};

/// Common trait for all LLM providers
///
/// The reshaping pipeline only needs to send one prompt and get text back,
/// so providers expose the raw body (for debug dumps) and a separate step
/// that pulls the generated text out of it.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Send a prompt and return the raw response body of a successful call
    ///
    /// # Arguments
    /// * `prompt` - The full prompt text
    ///
    /// # Returns
    /// * `Result<String, ServiceError>` - Raw body, or the transport/status failure
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;

    /// Extract the generated text from a raw response body
    fn extract_text(&self, raw_body: &str) -> Result<String, ResponseFormatError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}

pub mod gemini;
pub mod mock;
