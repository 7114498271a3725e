// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector abstraction and its result type

use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// One detected object in original-image pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub class_name: String,
    /// Score in `[0, 1]`
    pub confidence: f32,
    /// `[x1, y1, x2, y2]`, clamped to the image
    #[serde(rename = "box")]
    pub bbox: [i32; 4],
}

impl DetectionResult {
    pub fn new(class_name: impl Into<String>, confidence: f32, bbox: [i32; 4]) -> Self {
        Self {
            class_name: class_name.into(),
            confidence: confidence.clamp(0.0, 1.0),
            bbox,
        }
    }

    /// Label drawn on the annotated image, e.g. `"cat 0.87"`
    pub fn label(&self) -> String {
        format!("{} {:.2}", self.class_name, self.confidence)
    }
}

/// A loaded object detector
///
/// Implementations are shared across requests behind an `Arc` and called from
/// blocking worker threads.
pub trait ObjectDetector: Send + Sync {
    /// Run detection over a whole image
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionResult>>;

    /// Model name reported by `/health` and logs
    fn name(&self) -> &str;
}
