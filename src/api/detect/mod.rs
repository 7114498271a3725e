// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint module
//!
//! Provides POST /detect for multipart image uploads.

pub mod handler;
pub mod response;

pub use handler::{detect_handler, run_detection};
pub use response::DetectResponse;
