// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Loads the object detector once at start-up and reports its readiness

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::DetectorConfig;
use crate::vision::detection::ObjectDetector;
use crate::vision::yolo::{YoloDetector, YoloParams};

/// Readiness reported by `/health`
pub const STATUS_READY: &str = "ready";
pub const STATUS_FAILED: &str = "failed";

/// Information about a configured vision model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisionModelInfo {
    /// Model name
    pub name: String,
    /// Model type
    pub model_type: String,
    /// Whether the model is available
    pub available: bool,
}

/// Owner of the process-wide detector
///
/// The detector is read-only after construction. A failed load leaves it
/// absent; the detection endpoint then answers 503 instead of the process
/// exiting.
pub struct VisionModelManager {
    detector: Option<Arc<dyn ObjectDetector>>,
    model_name: String,
}

impl VisionModelManager {
    /// Load the YOLO detector described by `config`
    pub async fn new(config: &DetectorConfig) -> Self {
        let params = YoloParams {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            ..YoloParams::default()
        };
        let model_name = config
            .model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolov8".to_string());

        match YoloDetector::new(&config.model_path, config.input_size, params).await {
            Ok(detector) => {
                tracing::info!(
                    "✅ YOLO detector loaded from {}",
                    config.model_path.display()
                );
                Self {
                    detector: Some(Arc::new(detector)),
                    model_name,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Failed to load YOLO detector from {}: {:#}",
                    config.model_path.display(),
                    e
                );
                Self {
                    detector: None,
                    model_name,
                }
            }
        }
    }

    /// Wrap an already-constructed detector
    pub fn with_detector(detector: Arc<dyn ObjectDetector>) -> Self {
        let model_name = detector.name().to_string();
        Self {
            detector: Some(detector),
            model_name,
        }
    }

    /// A manager whose detector failed to load
    pub fn disabled() -> Self {
        Self {
            detector: None,
            model_name: "yolov8".to_string(),
        }
    }

    pub fn detector(&self) -> Option<Arc<dyn ObjectDetector>> {
        self.detector.clone()
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// `"ready"` or `"failed"`
    pub fn detector_status(&self) -> &'static str {
        if self.has_detector() {
            STATUS_READY
        } else {
            STATUS_FAILED
        }
    }

    /// List all configured vision models
    pub fn list_models(&self) -> Vec<VisionModelInfo> {
        vec![VisionModelInfo {
            name: self.model_name.clone(),
            model_type: "detection".to_string(),
            available: self.has_detector(),
        }]
    }
}
