// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Structured analysis endpoint handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::{debug, info};

use super::request::ImageRequest;
use super::response::analysis_response_schema;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::gemini::{ChatTurn, GeminiError, GenerateContentRequest, GenerationConfig, Part, Role};

/// Fixed instruction sent with every analysis request
pub const ANALYSIS_INSTRUCTION: &str = "Describe this image in one short paragraph and list \
every clearly visible object. For each object give a short label and its bounding box as \
[x_min, y_min, x_max, y_max], with coordinates normalized to the range 0-1000 relative to \
the image width and height.";

/// POST /analyze-objects - Describe an image and locate its objects
///
/// # Request
/// - `file_data`: base64 image data (a data URL prefix is accepted)
/// - `file_type`: image MIME type
///
/// # Response
/// The model's JSON, shaped as `AnalysisResult`, returned as-is.
///
/// # Errors
/// - 500: API key not configured, upstream failures after retries, or
///   malformed upstream JSON
/// - 400: invalid or unparseable payload (only checked once the key is known)
pub async fn analyze_objects_handler(
    State(state): State<AppState>,
    request: Result<Json<ImageRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let client = state.gemini_client()?;
    let Json(request) = request?;
    request.validate(state.max_upload_bytes)?;

    let payload = build_analysis_request(&request)?;
    debug!("Analysis request for {} image", request.file_type);

    let result = client.generate_json(&payload).await?;

    let object_count = result
        .get("detected_objects")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    info!("Analysis complete: {} objects", object_count);

    Ok(Json(result))
}

/// Image plus instruction, constrained to the flattened `AnalysisResult` schema
pub fn build_analysis_request(request: &ImageRequest) -> Result<GenerateContentRequest, GeminiError> {
    let schema = analysis_response_schema()?;
    let turn = ChatTurn::new(
        Role::User,
        vec![
            Part::inline_data(request.file_type.trim(), request.payload()),
            Part::text(ANALYSIS_INSTRUCTION),
        ],
    );

    Ok(GenerateContentRequest::from_turns(
        vec![turn],
        Some(GenerationConfig::structured(schema)),
    ))
}
