use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::Provider;
use crate::app_config::ReshapingConfig;
use crate::errors::{ResponseFormatError, ServiceError};

/// Gemini client for the `generateContent` endpoint
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key, sent as the `key` query parameter
    api_key: String,
    /// Base URL up to and including the API version
    endpoint: String,
    /// Model identifier, e.g. "gemini-1.5-flash"
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of output tokens
    max_output_tokens: u32,
    /// Client timeout, reported in timeout errors
    timeout_secs: u64,
    /// Extra attempts after a failed call
    max_retries: u32,
    /// Base backoff in milliseconds, doubled on each retry
    backoff_base_ms: u64,
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// `generateContent` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GenerationConfig,
}

/// A content block: a list of parts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A single part; only text parts are used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling parameters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// `generateContent` response body, reduced to what is used
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GeminiRequest {
    /// Single-turn request carrying `prompt`
    pub fn new(prompt: impl Into<String>, temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: Some(prompt.into()) }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens,
            },
        }
    }
}

impl GeminiResponse {
    /// Parse a raw response body
    pub fn from_body(raw_body: &str) -> Result<Self, ResponseFormatError> {
        serde_json::from_str(raw_body).map_err(|e| ResponseFormatError::MalformedEnvelope {
            message: e.to_string(),
            raw: raw_body.to_string(),
        })
    }

    /// Concatenated text parts of the first candidate
    pub fn text(&self) -> Result<String, ResponseFormatError> {
        let candidate = self.candidates.first().ok_or(ResponseFormatError::NoContent)?;

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                warn!("Gemini finished with reason {}, output may be truncated", reason);
            }
        }

        let texts: Vec<&str> = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .filter_map(|part| part.text.as_deref())
            .collect();

        if texts.is_empty() {
            return Err(ResponseFormatError::NoContent);
        }
        Ok(texts.concat())
    }
}

/// Extract the generated text from a raw `generateContent` body
pub fn extract_text_from_body(raw_body: &str) -> Result<String, ResponseFormatError> {
    GeminiResponse::from_body(raw_body)?.text()
}

impl Gemini {
    /// Create a new Gemini client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ServiceError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.3,
            max_output_tokens: 8192,
            timeout_secs,
            max_retries: 0,
            backoff_base_ms: 1000,
        })
    }

    /// Create a client from the reshaping configuration
    pub fn from_config(config: &ReshapingConfig) -> Result<Self, ServiceError> {
        Ok(Self::new(&config.api_key, &config.endpoint, &config.model, config.timeout_secs)?
            .with_generation(config.temperature, config.max_output_tokens)
            .with_retries(config.retry_count, config.retry_backoff_ms))
    }

    /// Set the sampling parameters
    pub fn with_generation(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Set bounded retry with exponential backoff
    pub fn with_retries(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full request URL, including the API key
    fn request_url(&self) -> Result<Url, ServiceError> {
        let base = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );
        let mut url = Url::parse(&base)
            .map_err(|e| ServiceError::RequestFailed(format!("Invalid endpoint URL {}: {}", base, e)))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Send one request without retrying
    async fn send_once(&self, url: &Url, request: &GeminiRequest) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(url.clone())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            error!("Gemini API error ({}): {}", status, body);
            return Err(ServiceError::Api {
                status_code: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    fn transport_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout_secs)
        } else {
            // reqwest errors include the URL, which carries the key
            ServiceError::RequestFailed(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl Provider for Gemini {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = self.request_url()?;
        let request = GeminiRequest::new(prompt, self.temperature, self.max_output_tokens);

        debug!("Sending request to Gemini API (model: {})", self.model);

        let mut attempt = 0;
        loop {
            match self.send_once(&url, &request).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.max_retries => {
                    let delay_ms = self.backoff_base_ms.saturating_mul(1 << attempt.min(16));
                    attempt += 1;
                    warn!(
                        "Gemini request failed ({}), retry {}/{} in {}ms",
                        e, attempt, self.max_retries, delay_ms
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn extract_text(&self, raw_body: &str) -> Result<String, ResponseFormatError> {
        extract_text_from_body(raw_body)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
