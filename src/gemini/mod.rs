// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gemini generative API client
//!
//! Thin typed layer over `models/{model}:generateContent`:
//! - `types`: request/response wire types and the chat turn model
//! - `schema`: flattening of JSON Schema into the API's inline dialect
//! - `retry`: bounded exponential backoff
//! - `transport`: the HTTP seam (reqwest in production, mocks in tests)
//! - `client`: the retrying client the HTTP handlers call

pub mod client;
pub mod retry;
pub mod schema;
pub mod transport;
pub mod types;

pub use client::{extract_candidate_text, GeminiClient, GeminiError};
pub use retry::{retry_with_backoff, AttemptOutcome, RetryError, RetryPolicy};
pub use schema::{flatten, flatten_root, SchemaError};
pub use transport::{GenerativeTransport, ReqwestTransport, TransportError, TransportResponse};
pub use types::{
    Blob, ChatTurn, Content, GenerateContentRequest, GenerationConfig, Part, Role,
};
