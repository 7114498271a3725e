// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrying client for the Gemini `generateContent` endpoint

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::retry::{retry_with_backoff, AttemptOutcome, RetryError, RetryPolicy};
use super::schema::SchemaError;
use super::transport::{GenerativeTransport, ReqwestTransport, TransportError, TransportResponse};
use super::types::GenerateContentRequest;
use crate::config::GeminiConfig;

/// Longest upstream body excerpt kept in logs and error messages
const MAX_BODY_EXCERPT: usize = 500;

/// Errors surfaced by the generative API client
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key configured; nothing was sent
    #[error("GEMINI_API_KEY is not configured on the server")]
    MissingApiKey,

    /// The service never responded usefully within the retry budget
    #[error("Gemini API request failed after {attempts} attempts: {detail}")]
    UpstreamTransport { attempts: u32, detail: String },

    /// The service responded, but not with the expected content
    #[error("Gemini API returned an unusable response: {0}")]
    UpstreamContent(String),

    /// The outgoing request could not be built
    #[error("Failed to build Gemini request: {0}")]
    Request(String),

    #[error("Response schema conversion failed: {0}")]
    Schema(#[from] SchemaError),
}

/// Why a single attempt failed
#[derive(Debug)]
enum AttemptFailure {
    Status { status: u16, body: String },
    Transport(TransportError),
    Content(String),
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptFailure::Status { status, body } => {
                write!(f, "HTTP {}: {}", status, excerpt(body))
            }
            AttemptFailure::Transport(e) => write!(f, "{}", e),
            AttemptFailure::Content(message) => write!(f, "{}", message),
        }
    }
}

/// Client for `models/{model}:generateContent` with retry and backoff
pub struct GeminiClient {
    transport: Arc<dyn GenerativeTransport>,
    api_key: String,
    base_url: String,
    model: String,
    retry_policy: RetryPolicy,
}

impl GeminiClient {
    /// Create a client using the production HTTP transport
    ///
    /// Fails with `MissingApiKey` when the configuration carries no key.
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let transport = ReqwestTransport::new(config.request_timeout())
            .map_err(|e| GeminiError::Request(e.to_string()))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(
        config: &GeminiConfig,
        transport: Arc<dyn GenerativeTransport>,
    ) -> Result<Self, GeminiError> {
        let api_key = config.api_key.clone().ok_or(GeminiError::MissingApiKey)?;

        info!(
            "Gemini client configured: base_url={}, model={}, max_retries={}",
            config.base_url, config.model, config.max_retries
        );

        Ok(Self {
            transport,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            retry_policy: config.retry_policy(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Endpoint without credentials (safe to log)
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn authenticated_url(&self) -> Result<String, GeminiError> {
        url::Url::parse_with_params(&self.endpoint(), &[("key", self.api_key.as_str())])
            .map(String::from)
            .map_err(|e| GeminiError::Request(format!("invalid endpoint URL: {}", e)))
    }

    /// Send a typed request and return the first candidate's text
    pub async fn generate_text(&self, request: &GenerateContentRequest) -> Result<String, GeminiError> {
        let payload = serde_json::to_value(request).map_err(|e| GeminiError::Request(e.to_string()))?;
        self.request_text(&payload).await
    }

    /// Send a typed request and parse the first candidate's text as JSON
    pub async fn generate_json(&self, request: &GenerateContentRequest) -> Result<Value, GeminiError> {
        let payload = serde_json::to_value(request).map_err(|e| GeminiError::Request(e.to_string()))?;
        self.request_json(&payload).await
    }

    /// POST `payload`, retrying transient failures, and parse the reply as JSON
    ///
    /// Text that is not valid JSON is an `UpstreamContent` error and is not
    /// retried.
    pub async fn request_json(&self, payload: &Value) -> Result<Value, GeminiError> {
        let text = self.request_text(payload).await?;
        serde_json::from_str(&text).map_err(|e| {
            error!(
                "Gemini returned non-JSON structured output: {} (text: {})",
                e,
                excerpt(&text)
            );
            GeminiError::UpstreamContent(format!("candidate text is not valid JSON: {}", e))
        })
    }

    /// POST `payload`, retrying transient failures, and return the reply text
    pub async fn request_text(&self, payload: &Value) -> Result<String, GeminiError> {
        let url = self.authenticated_url()?;
        let endpoint = self.endpoint();
        let attempts = self.retry_policy.attempts();

        let result = retry_with_backoff(&self.retry_policy, |attempt| {
            let url = url.as_str();
            let endpoint = endpoint.as_str();
            async move {
                debug!("Gemini attempt {}/{} -> {}", attempt, attempts, endpoint);
                match self.transport.post_json(url, payload).await {
                    Ok(response) => classify_response(response, attempt),
                    Err(e) => {
                        warn!("Gemini attempt {} transport failure: {}", attempt, e);
                        AttemptOutcome::Retryable(AttemptFailure::Transport(e))
                    }
                }
            }
        })
        .await;

        match result {
            Ok(text) => Ok(text),
            Err(RetryError::Exhausted { attempts, last }) => {
                error!("Gemini API failed after {} attempts: {}", attempts, last);
                Err(GeminiError::UpstreamTransport {
                    attempts,
                    detail: last.to_string(),
                })
            }
            Err(RetryError::Fatal { attempt, error }) => {
                error!("Gemini response unusable on attempt {}: {}", attempt, error);
                Err(GeminiError::UpstreamContent(error.to_string()))
            }
        }
    }
}

fn classify_response(response: TransportResponse, attempt: u32) -> AttemptOutcome<String, AttemptFailure> {
    if !response.is_success() {
        if response.status == 400 {
            error!(
                "Gemini rejected request with 400 on attempt {}: {}",
                attempt,
                excerpt(&response.body)
            );
        } else {
            warn!(
                "Gemini returned HTTP {} on attempt {}",
                response.status, attempt
            );
        }
        return AttemptOutcome::Retryable(AttemptFailure::Status {
            status: response.status,
            body: response.body,
        });
    }

    match extract_candidate_text(&response.body) {
        Ok(text) => AttemptOutcome::Success(text),
        Err(message) => AttemptOutcome::Fatal(AttemptFailure::Content(message)),
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response body
pub fn extract_candidate_text(body: &str) -> Result<String, String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| format!("response body is not JSON: {}", e))?;

    let text = value
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty());

    match text {
        Some(text) => Ok(text.to_string()),
        None => {
            let block_reason = value
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str);
            Err(match block_reason {
                Some(reason) => format!("prompt blocked by the API: {}", reason),
                None => "response has no candidates[0].content.parts[0].text".to_string(),
            })
        }
    }
}

fn excerpt(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_EXCERPT {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(MAX_BODY_EXCERPT).collect();
        format!("{}...", truncated)
    }
}
