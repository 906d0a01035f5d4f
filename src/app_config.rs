use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::file_utils::FileManager;
use crate::language_utils;
use crate::providers::gemini::DEFAULT_ENDPOINT;
use crate::translation::client::DEFAULT_CONTEXT;
use crate::translation::{BatchOptions, QuotaPolicy, RetryPolicy};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Batch engine tuning
    #[serde(default)]
    pub batch: BatchConfig,

    /// Translation cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Offline pseudo-translation
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: Provider type identifier
    #[serde(default)]
    pub provider: TranslationProvider,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: API key, falls back to GEMINI_API_KEY
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds per call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,

    // @field: Context line included in prompts
    #[serde(default = "default_context")]
    pub context: String,
}

impl TranslationConfig {
    /// Configured key, or the environment variable when the config leaves it empty
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.trim().is_empty() {
            return Some(self.api_key.trim().to_string());
        }
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            model: default_model(),
            api_key: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
            context: default_context(),
        }
    }
}

/// Batch engine configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BatchConfig {
    /// Maximum number of concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Attempts per unit for timeouts and transient errors
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_max_retry_backoff_ms")]
    pub max_retry_backoff_ms: u64,

    #[serde(default = "default_retry_jitter_ms")]
    pub retry_jitter_ms: u64,

    /// Global pause after the first quota error, doubled per consecutive error
    #[serde(default = "default_quota_backoff_ms")]
    pub quota_backoff_ms: u64,

    #[serde(default = "default_max_quota_backoff_ms")]
    pub max_quota_backoff_ms: u64,

    /// Consecutive quota errors before remaining units are given up
    #[serde(default = "default_quota_failure_threshold")]
    pub quota_failure_threshold: u32,

    /// Save the cache after this many new translations
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,
}

impl BatchConfig {
    pub fn to_options(&self) -> BatchOptions {
        BatchOptions {
            max_concurrent_requests: self.concurrent_requests,
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                base_backoff: Duration::from_millis(self.retry_backoff_ms),
                max_backoff: Duration::from_millis(self.max_retry_backoff_ms),
                jitter: Duration::from_millis(self.retry_jitter_ms),
            },
            quota: QuotaPolicy {
                base_pause: Duration::from_millis(self.quota_backoff_ms),
                max_pause: Duration::from_millis(self.max_quota_backoff_ms),
                failure_threshold: self.quota_failure_threshold,
            },
            flush_every: self.flush_every,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrent_requests(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_retry_backoff_ms: default_max_retry_backoff_ms(),
            retry_jitter_ms: default_retry_jitter_ms(),
            quota_backoff_ms: default_quota_backoff_ms(),
            max_quota_backoff_ms: default_max_quota_backoff_ms(),
            quota_failure_threshold: default_quota_failure_threshold(),
            flush_every: default_flush_every(),
        }
    }
}

/// Translation cache configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CacheConfig {
    /// Whether to read and write the cache file
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory for cache files; next to the input when unset
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_dir: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
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
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "fr".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_context() -> String {
    DEFAULT_CONTEXT.to_string()
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_max_retry_backoff_ms() -> u64 {
    30_000
}

fn default_retry_jitter_ms() -> u64 {
    250
}

fn default_quota_backoff_ms() -> u64 {
    10_000
}

fn default_max_quota_backoff_ms() -> u64 {
    120_000
}

fn default_quota_failure_threshold() -> u32 {
    5
}

fn default_flush_every() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_language_code(&self.target_language)
            .with_context(|| format!("Invalid target language code: '{}'", self.target_language))?;

        if self.translation.provider == TranslationProvider::Gemini {
            if self.translation.resolved_api_key().is_none() {
                return Err(anyhow!(
                    "Gemini requires an API key: set translation.api_key, pass --api-key or export {}",
                    API_KEY_ENV
                ));
            }
            if self.translation.model.trim().is_empty() {
                return Err(anyhow!("Model name must not be empty"));
            }
        }

        if self.translation.timeout_secs == 0 {
            return Err(anyhow!("translation.timeout_secs must be greater than 0"));
        }
        if self.batch.concurrent_requests == 0 {
            return Err(anyhow!("batch.concurrent_requests must be greater than 0"));
        }
        if self.batch.max_attempts == 0 {
            return Err(anyhow!("batch.max_attempts must be greater than 0"));
        }
        if self.batch.quota_failure_threshold == 0 {
            return Err(anyhow!("batch.quota_failure_threshold must be greater than 0"));
        }
        if self.batch.flush_every == 0 {
            return Err(anyhow!("batch.flush_every must be greater than 0"));
        }
        if self.batch.max_retry_backoff_ms < self.batch.retry_backoff_ms {
            return Err(anyhow!("batch.max_retry_backoff_ms must not be below batch.retry_backoff_ms"));
        }
        if self.batch.max_quota_backoff_ms < self.batch.quota_backoff_ms {
            return Err(anyhow!("batch.max_quota_backoff_ms must not be below batch.quota_backoff_ms"));
        }

        Ok(())
    }

    /// Load a config file, writing one with default values when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if FileManager::file_exists(path) {
            let content = FileManager::read_to_string(path)?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(path, &config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Self {
            target_language: default_target_language(),
            log_level: LogLevel::default(),
            translation: TranslationConfig::default(),
            batch: BatchConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}
