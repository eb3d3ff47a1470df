use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::reshaping::planner::DEFAULT_MAX_BATCH_SIZE;

/// Application configuration module
/// This module handles loading, layering and validating configuration.
/// The configuration is built once at startup and handed to the components
/// that need it; nothing reads the process environment afterwards.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Reshaping service settings
    #[serde(default)]
    pub reshaping: ReshapingConfig,

    /// Debug artifact settings
    #[serde(default)]
    pub debug: DebugConfig,

    /// Output file format
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Reshaping service configuration
#[derive(Serialize, Deserialize, Clone)]
pub struct ReshapingConfig {
    /// API key for the service
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Model name (e.g., "gemini-1.5-flash")
    #[serde(default = "default_model")]
    pub model: String,

    /// Service endpoint URL, up to the API version
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of output tokens per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of words per request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Retry count for failed requests (0 disables retrying)
    #[serde(default)]
    pub retry_count: u32,

    /// Backoff base for retries in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Spoken languages (ISO codes), main language first
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

impl std::fmt::Debug for ReshapingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReshapingConfig")
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_batch_size", &self.max_batch_size)
            .field("retry_count", &self.retry_count)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("languages", &self.languages)
            .finish()
    }
}

impl Default for ReshapingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            endpoint: default_endpoint(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
            max_batch_size: default_max_batch_size(),
            retry_count: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            languages: default_languages(),
        }
    }
}

/// Debug artifact configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DebugConfig {
    /// Write prompts, raw responses and per-batch subtitles to disk
    #[serde(default)]
    pub enabled: bool,

    /// Directory for debug artifacts
    #[serde(default = "default_debug_dir")]
    pub dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: default_debug_dir(),
        }
    }
}

/// Output file format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Srt,
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Json => "json",
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_batch_size() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_languages() -> Vec<String> {
    vec!["th".to_string(), "en".to_string()]
}

fn default_debug_dir() -> PathBuf {
    PathBuf::from("debug")
}

impl Config {
    /// Load a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Build the configuration from its layered sources.
    ///
    /// Defaults, then the JSON file if it exists, then the `.env` file, then
    /// the process environment.
    pub fn load(config_path: Option<&Path>, env_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };

        if let Some(env_file) = env_file {
            config.apply_env(&read_env_file(env_file));
        }

        let process_env: HashMap<String, String> = std::env::vars().collect();
        config.apply_env(&process_env);

        Ok(config)
    }

    /// Apply `GEMINI_*` and `DEBUG_*` overrides from a set of variables.
    ///
    /// Empty values are ignored, as are numbers that fail to parse.
    pub fn apply_env(&mut self, vars: &HashMap<String, String>) {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(api_key) = get("GEMINI_API_KEY") {
            self.reshaping.api_key = api_key.to_string();
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.reshaping.model = model.to_string();
        }
        if let Some(endpoint) = get("GEMINI_ENDPOINT") {
            self.reshaping.endpoint = endpoint.to_string();
        }
        if let Some(raw) = get("GEMINI_TEMPERATURE") {
            match raw.parse() {
                Ok(temperature) => self.reshaping.temperature = temperature,
                Err(_) => warn!("Ignoring invalid GEMINI_TEMPERATURE: {}", raw),
            }
        }
        if let Some(raw) = get("GEMINI_MAX_TOKENS") {
            match raw.parse() {
                Ok(max_tokens) => self.reshaping.max_output_tokens = max_tokens,
                Err(_) => warn!("Ignoring invalid GEMINI_MAX_TOKENS: {}", raw),
            }
        }
        if let Some(raw) = get("DEBUG_MODE") {
            match parse_bool(raw) {
                Some(enabled) => self.debug.enabled = enabled,
                None => warn!("Ignoring invalid DEBUG_MODE: {}", raw),
            }
        }
        if let Some(dir) = get("DEBUG_DIR") {
            self.debug.dir = PathBuf::from(dir);
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let reshaping = &self.reshaping;

        if reshaping.api_key.trim().is_empty() {
            return Err(anyhow!("GEMINI_API_KEY is not set"));
        }
        if reshaping.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }
        if !(0.0..=2.0).contains(&reshaping.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                reshaping.temperature
            ));
        }
        if reshaping.max_output_tokens == 0 {
            return Err(anyhow!("max_output_tokens must be greater than 0"));
        }
        if reshaping.max_batch_size == 0 {
            return Err(anyhow!("max_batch_size must be greater than 0"));
        }
        if reshaping.timeout_secs == 0 {
            return Err(anyhow!("timeout_secs must be greater than 0"));
        }

        crate::language_utils::describe_languages(&reshaping.languages)
            .context("Invalid languages setting")?;

        Ok(())
    }
}

/// Read `KEY=VALUE` pairs from a `.env` file.
///
/// A missing file yields no variables, and so does one that cannot be read
/// (with a warning). Blank lines and `#` comments are skipped and one level
/// of matching quotes is removed from values.
pub fn read_env_file<P: AsRef<Path>>(path: P) -> HashMap<String, String> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => parse_env(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
        Err(e) => {
            warn!("Ignoring unreadable env file {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

/// Parse `.env` content
pub fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), unquote(value.trim()).to_string()))
        .collect()
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() > 1
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[0] == bytes[bytes.len() - 1]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
