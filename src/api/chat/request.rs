// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat request types and validation

use serde::{Deserialize, Serialize};

use crate::api::analyze::request::validate_image_payload;
use crate::api::errors::ApiError;
use crate::gemini::ChatTurn;
use crate::vision::strip_data_url;

/// Request for POST /chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Base64 image data; a `data:<mime>;base64,` prefix is accepted
    #[serde(default)]
    pub file_data: String,

    /// MIME type of the image
    #[serde(default)]
    pub file_type: String,

    /// The user's question about the image
    #[serde(default)]
    pub prompt: String,

    /// Earlier turns, oldest first; `assistant` is accepted for model turns
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

impl ChatRequest {
    pub fn validate(&self, max_bytes: usize) -> Result<(), ApiError> {
        if self.prompt.trim().is_empty() {
            return Err(ApiError::validation("prompt", "prompt is required"));
        }
        validate_image_payload(&self.file_data, &self.file_type, max_bytes)
    }

    /// Base64 payload without any data URL prefix
    pub fn payload(&self) -> &str {
        strip_data_url(&self.file_data)
    }
}
