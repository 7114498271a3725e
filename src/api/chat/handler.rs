// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision chat endpoint handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, info};

use super::request::ChatRequest;
use super::response::ChatResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::gemini::{ChatTurn, GenerateContentRequest, Part, Role};

/// Instruction prepended to every conversation
pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are a helpful vision assistant. Answer questions \
about the attached image accurately and concisely. If something cannot be determined from the \
image, say so instead of guessing.";

/// POST /chat - Ask a question about an image
///
/// # Request
/// - `file_data`, `file_type`: the image
/// - `prompt`: the question
/// - `history`: earlier `{role, parts}` turns, oldest first
///
/// # Response
/// - `response`: the model's reply text
///
/// # Errors
/// Same as /analyze-objects: 500 for a missing key or upstream failures,
/// 400 for an invalid payload.
pub async fn chat_handler(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let client = state.gemini_client()?;
    let Json(request) = request?;
    request.validate(state.max_upload_bytes)?;

    debug!("Chat request with {} history turns", request.history.len());

    let payload = GenerateContentRequest::from_turns(build_chat_turns(&request), None);
    let response = client.generate_text(&payload).await?;

    info!("Chat reply: {} chars", response.len());

    Ok(Json(ChatResponse { response }))
}

/// System instruction, then history verbatim, then the current question with the image
pub fn build_chat_turns(request: &ChatRequest) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(request.history.len() + 2);
    turns.push(ChatTurn::new(
        Role::System,
        vec![Part::text(CHAT_SYSTEM_INSTRUCTION)],
    ));
    turns.extend(request.history.iter().cloned());
    turns.push(ChatTurn::new(
        Role::User,
        vec![
            Part::text(request.prompt.trim()),
            Part::inline_data(request.file_type.trim(), request.payload()),
        ],
    ));
    turns
}
