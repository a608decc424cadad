//! Display configuration
//!
//! Passed explicitly to [`DisplayAdapter::new`](crate::DisplayAdapter::new);
//! nothing in the core reads process-wide state.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Retry policy for one failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_num_retry: u32,
    pub retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_num_retry: 2,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 8000,
        }
    }
}

/// Fragment loading policy handed to the streaming engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadPolicy {
    pub max_load_time_ms: u64,
    pub max_time_to_first_byte_ms: u64,
    pub error_retry: RetryConfig,
    pub timeout_retry: RetryConfig,
}

impl Default for LoadPolicy {
    fn default() -> Self {
        Self {
            // first requests to an origin can be slow
            max_load_time_ms: 30_000,
            max_time_to_first_byte_ms: 30_000,
            error_retry: RetryConfig::default(),
            timeout_retry: RetryConfig {
                max_num_retry: 3,
                retry_delay_ms: 0,
                max_retry_delay_ms: 0,
            },
        }
    }
}

/// Streaming engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Forward buffer size in bytes
    pub max_buffer_size: u64,
    /// Subtitles are rendered by the UI layer, not the engine
    pub render_text_tracks_natively: bool,
    pub fragment_load_policy: LoadPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_buffer_size: 500 * 1000 * 1000, // 500 MB
            render_text_tracks_natively: false,
            fragment_load_policy: LoadPolicy::default(),
        }
    }
}

/// Display adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub engine: EngineConfig,
    /// Bound on waiting for a subtitle track to load
    pub subtitle_wait_timeout_ms: u64,
    /// Audio language selected when a manifest offers it
    pub preferred_audio_language: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            subtitle_wait_timeout_ms: 5000,
            preferred_audio_language: None,
        }
    }
}

impl DisplayConfig {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DisplayConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_preferred_audio_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_audio_language = Some(language.into());
        self
    }

    pub fn subtitle_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.subtitle_wait_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.subtitle_wait_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "subtitle_wait_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.engine.max_buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "engine.max_buffer_size must be greater than zero".into(),
            ));
        }

        let policy = &self.engine.fragment_load_policy;
        if policy.max_load_time_ms == 0 || policy.max_time_to_first_byte_ms == 0 {
            return Err(Error::InvalidConfig(
                "fragment load timeouts must be greater than zero".into(),
            ));
        }
        for (name, retry) in [
            ("error_retry", &policy.error_retry),
            ("timeout_retry", &policy.timeout_retry),
        ] {
            if retry.retry_delay_ms > retry.max_retry_delay_ms {
                return Err(Error::InvalidConfig(format!(
                    "{}: retry_delay_ms ({}) exceeds max_retry_delay_ms ({})",
                    name, retry.retry_delay_ms, retry.max_retry_delay_ms
                )));
            }
        }
        Ok(())
    }
}
