// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 detector: letterbox preprocessing, ONNX inference, NMS decoding

pub mod classes;
pub mod detector;
pub mod postprocessing;
pub mod preprocessing;

pub use classes::{class_name, COCO_CLASSES};
pub use detector::YoloDetector;
pub use postprocessing::{decode_predictions, non_max_suppression, Candidate, YoloParams};
pub use preprocessing::{letterbox, preprocess, LetterboxInfo, PAD_VALUE};
