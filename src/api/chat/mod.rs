// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision chat endpoint module
//!
//! Provides POST /chat: free-text conversation about an image with prior
//! turns replayed to the generative API.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{build_chat_turns, chat_handler, CHAT_SYSTEM_INSTRUCTION};
pub use request::ChatRequest;
pub use response::ChatResponse;
