// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detector configuration

use std::path::PathBuf;

use super::{env_opt, env_or, ConfigError};

pub const DEFAULT_DETECTOR_MODEL_PATH: &str = "./models/yolov8n.onnx";

/// Detector model location, thresholds and annotation font
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// YOLOv8 ONNX export
    pub model_path: PathBuf,
    /// Minimum class score kept
    pub confidence_threshold: f32,
    /// IoU above which same-class boxes are suppressed
    pub iou_threshold: f32,
    /// Square model input side in pixels
    pub input_size: u32,
    /// TrueType font for annotation labels
    pub font_path: Option<PathBuf>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_DETECTOR_MODEL_PATH),
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            input_size: 640,
            font_path: None,
        }
    }
}

impl DetectorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: env_opt("DETECTOR_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            confidence_threshold: env_or("DETECTOR_CONFIDENCE", defaults.confidence_threshold),
            iou_threshold: env_or("DETECTOR_IOU", defaults.iou_threshold),
            input_size: env_or("DETECTOR_INPUT_SIZE", defaults.input_size),
            font_path: env_opt("ANNOTATION_FONT_PATH").map(PathBuf::from),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::invalid(
                "DETECTOR_CONFIDENCE",
                "must be between 0 and 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(ConfigError::invalid("DETECTOR_IOU", "must be between 0 and 1"));
        }
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(ConfigError::invalid(
                "DETECTOR_INPUT_SIZE",
                "must be a positive multiple of 32",
            ));
        }
        Ok(())
    }
}
