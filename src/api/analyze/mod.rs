// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Structured object analysis endpoint module
//!
//! Provides POST /analyze-objects: the generative API describes the image
//! and lists objects, constrained to the `AnalysisResult` schema.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{analyze_objects_handler, build_analysis_request, ANALYSIS_INSTRUCTION};
pub use request::ImageRequest;
pub use response::{analysis_response_schema, AnalysisResult, DetectedObject};
