// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the Gemini generative API

use std::time::Duration;

use super::{env_opt, env_or, ConfigError};
use crate::gemini::RetryPolicy;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Gemini endpoint, credentials and retry budget
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key; absent keys degrade the generative endpoints to a fixed error
    pub api_key: Option<String>,
    /// Model name used in `models/{model}:generateContent`
    pub model: String,
    /// API root, without trailing slash
    pub base_url: String,
    /// Attempts per outbound call
    pub max_retries: u32,
    /// Delay after the first failed attempt in milliseconds
    pub initial_delay_ms: u64,
    /// Per-attempt HTTP timeout in seconds
    pub request_timeout_secs: u64,
}

// Keeps the key out of logs
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("initial_delay_ms", &self.initial_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            max_retries: 3,
            initial_delay_ms: 1000,
            request_timeout_secs: 60,
        }
    }
}

impl GeminiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_opt("GEMINI_API_KEY"),
            model: env_opt("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: env_opt("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            max_retries: env_or("GEMINI_MAX_RETRIES", defaults.max_retries),
            initial_delay_ms: env_or("GEMINI_INITIAL_DELAY_MS", defaults.initial_delay_ms),
            request_timeout_secs: env_or("GEMINI_TIMEOUT_SECS", defaults.request_timeout_secs),
        }
    }

    /// Validate the configuration (a missing key is not an error here)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::invalid(
                "GEMINI_MAX_RETRIES",
                "must be at least 1",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "GEMINI_TIMEOUT_SECS",
                "must be greater than 0",
            ));
        }
        if self.model.is_empty() {
            return Err(ConfigError::invalid("GEMINI_MODEL", "must not be empty"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid("GEMINI_BASE_URL", e.to_string()))?;
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.initial_delay_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
