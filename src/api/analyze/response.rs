// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Structured analysis result and its wire schema

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gemini::{flatten_root, GeminiError};

/// One object located by the generative model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectedObject {
    /// Short object name
    pub label: String,
    /// `[x_min, y_min, x_max, y_max]` normalized to 0-1000
    #[serde(rename = "box")]
    pub bbox: [i32; 4],
}

/// Description plus located objects, as returned by /analyze-objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// One-paragraph description of the image
    pub description: String,
    pub detected_objects: Vec<DetectedObject>,
}

/// `AnalysisResult` schema in the generative API's inline dialect
pub fn analysis_response_schema() -> Result<Value, GeminiError> {
    let root = schema_for!(AnalysisResult);
    let schema = serde_json::to_value(&root)
        .map_err(|e| GeminiError::Request(format!("failed to serialize schema: {}", e)))?;
    Ok(flatten_root(&schema)?)
}
