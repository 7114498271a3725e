// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartRejection;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

use crate::gemini::GeminiError;
use crate::vision::ImageError;

/// Fixed message for the missing-secret case; never varies with input
pub const MISSING_API_KEY_MESSAGE: &str =
    "Server configuration error: GEMINI_API_KEY is not set.";

pub const DETECTOR_UNAVAILABLE_MESSAGE: &str =
    "YOLO Model not loaded. Check server logs for details.";

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
}

#[derive(Debug, Clone)]
pub enum ApiError {
    /// A required secret is not configured
    Configuration(String),
    InvalidRequest(String),
    ValidationError {
        field: String,
        message: String,
    },
    ServiceUnavailable(String),
    /// The generative API kept failing after every retry
    UpstreamTransport(String),
    /// The generative API answered with unusable content
    UpstreamContent(String),
    InternalError(String),
}

impl ApiError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, detail) = match self {
            ApiError::Configuration(msg) => ("configuration_error", msg.clone()),
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone()),
            ApiError::ValidationError { field, message } => {
                ("validation_error", format!("{}: {}", field, message))
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg.clone()),
            ApiError::UpstreamTransport(msg) => ("upstream_transport_error", msg.clone()),
            ApiError::UpstreamContent(msg) => ("upstream_content_error", msg.clone()),
            ApiError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        ErrorResponse {
            detail,
            error_type: error_type.to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) | ApiError::ValidationError { .. } => 400,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::Configuration(_)
            | ApiError::UpstreamTransport(_)
            | ApiError::UpstreamContent(_)
            | ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::ValidationError { field, message } => {
                write!(f, "Validation error for {}: {}", field, message)
            }
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
            ApiError::UpstreamTransport(msg) => write!(f, "Upstream transport error: {}", msg),
            ApiError::UpstreamContent(msg) => write!(f, "Upstream content error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("{} -> {}", self, status);
        } else {
            warn!("{} -> {}", self, status);
        }

        (status, Json(self.to_response())).into_response()
    }
}

impl From<GeminiError> for ApiError {
    fn from(err: GeminiError) -> Self {
        match err {
            GeminiError::MissingApiKey => {
                ApiError::Configuration(MISSING_API_KEY_MESSAGE.to_string())
            }
            GeminiError::UpstreamTransport { .. } => ApiError::UpstreamTransport(err.to_string()),
            GeminiError::UpstreamContent(_) => ApiError::UpstreamContent(err.to_string()),
            GeminiError::Request(_) | GeminiError::Schema(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::InvalidRequest(format!("Expected a multipart form upload: {}", rejection))
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::EncodeFailed(_) => ApiError::InternalError(err.to_string()),
            _ => ApiError::InvalidRequest(format!("Could not decode image file: {}", err)),
        }
    }
}
