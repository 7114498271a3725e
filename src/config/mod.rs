// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide configuration loaded once at start-up
//!
//! Values come from environment variables (a `.env` file is honoured by the
//! binary) and are injected into handler state; nothing reads the environment
//! after start-up.

pub mod detector;
pub mod gemini;
pub mod service;

pub use detector::DetectorConfig;
pub use gemini::GeminiConfig;
pub use service::{ServiceConfig, ServiceKind};

use thiserror::Error;
use tracing::warn;

/// Invalid configuration value
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Read and parse an environment variable, falling back to `default`
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    parse_or(key, env_opt(key).as_deref(), default)
}

/// Unset values keep `default`; unparseable ones keep it with a warning
fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<&str>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };

    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}; using the default", key, raw);
            default
        }
    }
}

/// Read an environment variable, treating blank values as unset
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
