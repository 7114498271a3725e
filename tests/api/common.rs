// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for the endpoint tests: a scripted generative transport,
//! a stub detector and helpers to drive the router.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use image::{DynamicImage, RgbImage};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use vision_relay::{
    config::{GeminiConfig, ServiceKind},
    create_router,
    gemini::{GeminiClient, GenerativeTransport, TransportError, TransportResponse},
    vision::{Annotator, DetectionResult, ObjectDetector, VisionModelManager},
    AppState,
};

pub const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

pub const CANNED_ANALYSIS_BODY: &str = r#"{"candidates":[{"content":{"parts":[{"text":"{\"description\":\"a cat\",\"detected_objects\":[]}"}]}}]}"#;

const BODY_LIMIT: usize = 20 * 1024 * 1024;
const BOUNDARY: &str = "vision-relay-test-boundary";

/// Transport that replays scripted responses and records what was sent
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<TransportResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every call answers with `status` and `body`
    pub fn always(status: u16, body: &str, times: usize) -> Arc<Self> {
        Self::new(
            (0..times)
                .map(|_| Ok(TransportResponse::new(status, body)))
                .collect(),
        )
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerativeTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &Value,
    ) -> Result<TransportResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), payload.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("script exhausted".to_string())))
    }
}

/// Detector that reports one fixed object
pub struct StubDetector;

impl ObjectDetector for StubDetector {
    fn detect(&self, _image: &DynamicImage) -> anyhow::Result<Vec<DetectionResult>> {
        Ok(vec![DetectionResult::new("cat", 0.87, [0, 0, 1, 1])])
    }

    fn name(&self) -> &str {
        "stub-yolo"
    }
}

pub fn gemini_config() -> GeminiConfig {
    GeminiConfig {
        api_key: Some("test-key".to_string()),
        model: "gemini-test".to_string(),
        base_url: "https://generative.test/v1beta".to_string(),
        max_retries: 3,
        initial_delay_ms: 1,
        request_timeout_secs: 5,
    }
}

pub fn state_with_transport(transport: Arc<ScriptedTransport>) -> AppState {
    let client = GeminiClient::with_transport(&gemini_config(), transport)
        .expect("client with key");
    AppState::new(
        VisionModelManager::disabled(),
        Annotator::default(),
        Some(client),
        1024 * 1024,
    )
}

pub fn state_with_detector() -> AppState {
    AppState::new(
        VisionModelManager::with_detector(Arc::new(StubDetector)),
        Annotator::default(),
        None,
        1024 * 1024,
    )
}

pub fn router(state: AppState) -> Router {
    create_router(state, ServiceKind::All, BODY_LIMIT)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut cursor = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("encode png");
    cursor.into_inner()
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST with an arbitrary body, for requests the extractors cannot parse
pub fn raw_request(uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn multipart_request(field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/detect")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Send one request through the router and parse the JSON body
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
