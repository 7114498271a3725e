// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{extract::State, Json};
use axum_extra::extract::{multipart::MultipartRejection, Multipart};
use tracing::{debug, info, warn};

use super::response::DetectResponse;
use crate::api::errors::{ApiError, DETECTOR_UNAVAILABLE_MESSAGE};
use crate::api::http_server::AppState;
use crate::vision::{decode_image_bytes, Annotator, DetectionResult, ObjectDetector};

/// Multipart field carrying the image
const FILE_FIELD: &str = "file";

struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

/// POST /detect - Detect objects in an uploaded image
///
/// # Request
/// Multipart form with the image in field `file`.
///
/// # Response
/// - `message`: fixed success message
/// - `filename`: the upload's file name
/// - `detection_results`: `{class_name, confidence, box}` per object
/// - `annotated_image_base64`: JPEG with boxes and labels drawn
///
/// # Errors
/// - 503 Service Unavailable: detector not loaded
/// - 400 Bad Request: missing file or undecodable image
/// - 500 Internal Server Error: inference failed
pub async fn detect_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let detector = state.vision_model_manager.detector().ok_or_else(|| {
        warn!("Detection requested but detector is not loaded");
        ApiError::ServiceUnavailable(DETECTOR_UNAVAILABLE_MESSAGE.to_string())
    })?;

    let mut multipart = multipart?;
    let upload = read_upload(&mut multipart).await?;
    debug!("Received upload '{}' ({} bytes)", upload.filename, upload.bytes.len());

    let annotator = state.annotator.clone();
    let max_bytes = state.max_upload_bytes;
    let bytes = upload.bytes;

    let (results, annotated) = tokio::task::spawn_blocking(move || {
        run_detection(detector.as_ref(), &annotator, &bytes, max_bytes)
    })
    .await
    .map_err(|e| ApiError::InternalError(format!("Detection task failed: {}", e)))??;

    info!(
        "Detection complete for '{}': {} objects",
        upload.filename,
        results.len()
    );

    Ok(Json(DetectResponse::new(upload.filename, results, annotated)))
}

/// Decode, detect and annotate; blocking
pub fn run_detection(
    detector: &dyn ObjectDetector,
    annotator: &Annotator,
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(Vec<DetectionResult>, String), ApiError> {
    let (image, info) = decode_image_bytes(bytes, max_bytes)?;
    debug!("Decoded image: {}x{} {:?}", info.width, info.height, info.format);

    let results = detector.detect(&image).map_err(|e| {
        ApiError::InternalError(format!("Internal Server Error during detection: {}", e))
    })?;

    let annotated = annotator.annotate_to_base64(&image, &results);
    Ok((results, annotated))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to read upload: {}", e)))?;

        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::validation(FILE_FIELD, "an image file is required"))
}
