// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image payload shared by the generative endpoints

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::{decode_base64_payload, is_image_mime, strip_data_url};

/// Request for POST /analyze-objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Base64 image data; a `data:<mime>;base64,` prefix is accepted
    #[serde(default)]
    pub file_data: String,

    /// MIME type of the image, e.g. `image/png`
    #[serde(default)]
    pub file_type: String,
}

impl ImageRequest {
    /// Validate the payload against `max_bytes` decoded
    pub fn validate(&self, max_bytes: usize) -> Result<(), ApiError> {
        validate_image_payload(&self.file_data, &self.file_type, max_bytes)
    }

    /// Base64 payload without any data URL prefix
    pub fn payload(&self) -> &str {
        strip_data_url(&self.file_data)
    }
}

/// Checks shared by every endpoint that forwards inline image data
pub(crate) fn validate_image_payload(
    file_data: &str,
    file_type: &str,
    max_bytes: usize,
) -> Result<(), ApiError> {
    if strip_data_url(file_data).is_empty() {
        return Err(ApiError::validation("file_data", "file_data is required"));
    }

    if !is_image_mime(file_type) {
        return Err(ApiError::validation(
            "file_type",
            format!("'{}' is not an image MIME type", file_type),
        ));
    }

    decode_base64_payload(file_data, max_bytes)
        .map_err(|e| ApiError::validation("file_data", e.to_string()))?;

    Ok(())
}
