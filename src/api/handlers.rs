// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::version::VERSION_NUMBER;
use crate::vision::VisionModelInfo;

pub const HEALTH_MESSAGE: &str = "AI Analysis API is running.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    /// `"ready"` or `"failed"`
    pub yolo_model: String,
    /// `"configured"` or `"missing_key"`
    pub gemini_api: String,
    pub version: String,
    /// Detector models with their availability
    pub models: Vec<VisionModelInfo>,
}

/// GET /health - liveness plus detector and API-key readiness
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let gemini_api = if state.gemini.is_some() {
        "configured"
    } else {
        "missing_key"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        message: HEALTH_MESSAGE.to_string(),
        yolo_model: state.vision_model_manager.detector_status().to_string(),
        gemini_api: gemini_api.to_string(),
        version: VERSION_NUMBER.to_string(),
        models: state.vision_model_manager.list_models(),
    })
}
