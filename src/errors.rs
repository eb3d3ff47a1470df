/*!
 * Error types for the ytautosub application.
 *
 * Each pipeline stage has its own error enum, defined with thiserror.
 * `AppError` wraps them with the context of where a run failed.
 */

use thiserror::Error;

/// Errors raised while reading or extracting the timed-text document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document could not be read from disk
    #[error("Failed to read timed-text document: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed XML
    #[error("Failed to parse timed-text XML: {0}")]
    Xml(String),

    /// The root element is not `<timedtext>`
    #[error("Expected <timedtext> root element, found <{0}>")]
    UnexpectedRoot(String),

    /// Extraction produced no words
    #[error("No word timings extracted: the document contains nothing to subtitle")]
    Empty,
}

/// Transport-level failures talking to the reshaping service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The request could not be sent or its body could not be read
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// The request did not complete within the client timeout
    #[error("API request timed out after {0} seconds")]
    Timeout(u64),

    /// The service answered with a non-success status
    #[error("API responded with error: {status_code} - {body}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Raw response body, kept for diagnostics
        body: String,
    },
}

/// The service answered, but not with something we can trust
#[derive(Error, Debug)]
pub enum ResponseFormatError {
    /// No candidate or no part in the response envelope
    #[error("No content in the API response")]
    NoContent,

    /// The response envelope itself is not the expected JSON
    #[error("Failed to parse API response envelope: {message}")]
    MalformedEnvelope {
        message: String,
        raw: String,
    },

    /// The generated text is not a JSON array of subtitle candidates
    #[error("Failed to parse subtitle array: {message}\nResponse was: {raw}")]
    InvalidJson {
        message: String,
        raw: String,
    },

    /// The array parsed but breaks an ordering or range rule
    #[error("Invalid subtitle candidates: {reason}")]
    InvalidCandidates {
        reason: String,
        raw: String,
    },
}

impl ResponseFormatError {
    /// Raw text that failed to decode, when there is one
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            Self::NoContent => None,
            Self::MalformedEnvelope { raw, .. }
            | Self::InvalidJson { raw, .. }
            | Self::InvalidCandidates { raw, .. } => Some(raw),
        }
    }
}

/// Anything that can go wrong during a single reshaping call
#[derive(Error, Debug)]
pub enum ReshapeError {
    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] serde_json::Error),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Response format error: {0}")]
    ResponseFormat(#[from] ResponseFormatError),
}

impl ReshapeError {
    /// Pipeline stage the error belongs to
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Prompt(_) => "prompt",
            Self::Service(_) => "request",
            Self::ResponseFormat(_) => "response",
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the extraction stage
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// A batch failed; the whole run is aborted
    #[error("Batch {batch_number} failed during {stage}: {source}")]
    Batch {
        batch_number: usize,
        stage: &'static str,
        #[source]
        source: ReshapeError,
    },
}

impl AppError {
    /// Wrap a reshaping failure with the batch it happened in
    pub fn batch(batch_number: usize, source: ReshapeError) -> Self {
        Self::Batch {
            batch_number,
            stage: source.stage(),
            source,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
