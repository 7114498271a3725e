// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detector on ONNX Runtime
//!
//! Runs on CPU. The session sits behind a mutex because `Session::run`
//! needs `&mut`; requests serialize on it while pre/postprocessing stays
//! parallel.

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::postprocessing::{decode_predictions, YoloParams};
use super::preprocessing::preprocess;
use crate::vision::detection::{DetectionResult, ObjectDetector};

/// YOLOv8 detector loaded from an ONNX export
#[derive(Clone)]
pub struct YoloDetector {
    session: Arc<Mutex<Session>>,
    input_name: String,
    input_size: u32,
    params: YoloParams,
    name: String,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector from an ONNX file
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime rejects it.
    pub async fn new<P: AsRef<Path>>(model_path: P, input_size: u32, params: YoloParams) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("YOLO model not found: {}", model_path.display());
        }

        info!("Loading YOLO model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load YOLO model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let name = model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolov8".to_string());

        debug!("YOLO model input: {}, size {}", input_name, input_size);
        info!("YOLO model '{}' loaded (CPU-only)", name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_size,
            params,
            name,
        })
    }
}

impl ObjectDetector for YoloDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<DetectionResult>> {
        let (tensor, letterbox) = preprocess(image, self.input_size);

        let input_value = Value::from_array(tensor).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("YOLO session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("YOLO inference failed")?;

        let predictions = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract YOLO output tensor")?;

        debug!("YOLO output shape: {:?}", predictions.shape());

        let results = decode_predictions(predictions.view(), &letterbox, &self.params)?;
        debug!("YOLO detected {} objects", results.len());
        Ok(results)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
