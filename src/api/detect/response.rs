// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::vision::DetectionResult;

pub const DETECT_SUCCESS_MESSAGE: &str = "Image analyzed successfully.";

/// Response for POST /detect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    pub message: String,
    /// Client-supplied file name of the upload
    pub filename: String,
    pub detection_results: Vec<DetectionResult>,
    /// JPEG of the upload with boxes drawn; empty if encoding failed
    pub annotated_image_base64: String,
}

impl DetectResponse {
    pub fn new(
        filename: impl Into<String>,
        detection_results: Vec<DetectionResult>,
        annotated_image_base64: String,
    ) -> Self {
        Self {
            message: DETECT_SUCCESS_MESSAGE.to_string(),
            filename: filename.into(),
            detection_results,
            annotated_image_base64,
        }
    }
}
