// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for the detection service
//!
//! This module provides:
//! - Object detection via YOLOv8 on ONNX Runtime (CPU)
//! - Annotation of detections onto a JPEG copy of the upload
//! - Upload decoding and validation shared with the chat service

pub mod annotate;
pub mod detection;
pub mod image_utils;
pub mod model_manager;
pub mod yolo;

pub use annotate::Annotator;
pub use detection::{DetectionResult, ObjectDetector};
pub use image_utils::{
    decode_base64_payload, decode_image_bytes, detect_format, encode_jpeg_base64, is_image_mime,
    strip_data_url, ImageError, ImageInfo,
};
pub use model_manager::{VisionModelInfo, VisionModelManager};
