// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP service configuration

use clap::ValueEnum;
use std::net::SocketAddr;

use super::{env_opt, env_or, ConfigError};

/// Default maximum decoded upload size (10MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which routes a process serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ServiceKind {
    /// `/health` + `/detect`
    Detection,
    /// `/health` + `/analyze-objects` + `/chat`
    Chat,
    /// Every route on one listener
    All,
}

impl ServiceKind {
    pub fn serves_detection(&self) -> bool {
        matches!(self, ServiceKind::Detection | ServiceKind::All)
    }

    pub fn serves_chat(&self) -> bool {
        matches!(self, ServiceKind::Chat | ServiceKind::All)
    }
}

/// Listener and request-size settings
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Socket address to bind
    pub listen_addr: String,
    /// Largest decoded image accepted on any endpoint
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: env_opt("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("LISTEN_ADDR", e.to_string()))?;

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::invalid(
                "MAX_UPLOAD_BYTES",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Request body limit: base64 JSON bodies run ~4/3 of the decoded size
    pub fn body_limit_bytes(&self) -> usize {
        self.max_upload_bytes.saturating_mul(2)
    }
}
