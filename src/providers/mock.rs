/*!
 * Mock provider for testing.
 *
 * Replies are served in the Gemini wire format so the real envelope parser
 * is exercised:
 * - `MockProvider::scripted(...)` - Serves a fixed queue of replies in order
 * - `MockProvider::from_fn(...)` - Computes each reply from the prompt
 */

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::Provider;
use super::gemini::extract_text_from_body;
use crate::errors::{ResponseFormatError, ServiceError};
use crate::reshaping::response::CandidateSubtitle;

type Responder = Box<dyn Fn(&str) -> Result<String, ServiceError> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<Result<String, ServiceError>>>),
    Function(Responder),
}

/// Mock provider that never touches the network
pub struct MockProvider {
    script: Script,
    /// Every prompt received, in order
    prompts: Mutex<Vec<String>>,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("calls", &self.call_count())
            .finish()
    }
}

impl MockProvider {
    /// Serve `replies` in order; calls past the end fail
    pub fn scripted(replies: Vec<Result<String, ServiceError>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(replies.into())),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Compute each reply from the prompt
    pub fn from_fn(
        responder: impl Fn(&str) -> Result<String, ServiceError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            script: Script::Function(Box::new(responder)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Wrap generated text in a `generateContent` response body
    pub fn envelope(text: &str) -> String {
        serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": text }], "role": "model" },
                "finishReason": "STOP"
            }]
        })
        .to_string()
    }

    /// Response body whose generated text is `candidates` as a fenced JSON array
    pub fn candidates_reply(candidates: &[CandidateSubtitle]) -> String {
        let array = serde_json::to_string_pretty(candidates).unwrap_or_else(|_| "[]".to_string());
        Self::envelope(&format!("```json\n{}\n```", array))
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Copy of every prompt received
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.script {
            Script::Function(responder) => responder(prompt),
            Script::Queue(queue) => queue
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front())
                .unwrap_or_else(|| {
                    Err(ServiceError::RequestFailed("Mock script exhausted".to_string()))
                }),
        }
    }

    fn extract_text(&self, raw_body: &str) -> Result<String, ResponseFormatError> {
        extract_text_from_body(raw_body)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
