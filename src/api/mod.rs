// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod analyze;
pub mod chat;
pub mod detect;
pub mod errors;
pub mod handlers;
pub mod http_server;

pub use analyze::{analyze_objects_handler, AnalysisResult, DetectedObject, ImageRequest};
pub use chat::{chat_handler, ChatRequest, ChatResponse};
pub use detect::{detect_handler, DetectResponse};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{health_handler, HealthResponse};
pub use http_server::{create_router, start_server, AppState};
