// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /analyze-objects end to end through the router

use axum::http::StatusCode;
use serde_json::json;
use vision_relay::{
    api::errors::MISSING_API_KEY_MESSAGE,
    gemini::{TransportError, TransportResponse},
    AppState,
};

use super::common::{
    json_request, raw_request, router, send, state_with_transport, ScriptedTransport,
    CANNED_ANALYSIS_BODY, TINY_PNG_BASE64,
};

fn analysis_body() -> serde_json::Value {
    json!({"file_data": TINY_PNG_BASE64, "file_type": "image/png"})
}

#[tokio::test]
async fn test_canned_response_returned_verbatim() {
    let transport = ScriptedTransport::always(200, CANNED_ANALYSIS_BODY, 1);
    let app = router(state_with_transport(transport.clone()));

    let (status, body) = send(app, json_request("/analyze-objects", &analysis_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"description": "a cat", "detected_objects": []}));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_outbound_request_shape() {
    let transport = ScriptedTransport::always(200, CANNED_ANALYSIS_BODY, 1);
    let app = router(state_with_transport(transport.clone()));

    send(app, json_request("/analyze-objects", &analysis_body())).await;

    let calls = transport.calls();
    let (url, payload) = &calls[0];
    assert_eq!(
        url,
        "https://generative.test/v1beta/models/gemini-test:generateContent?key=test-key"
    );
    assert_eq!(
        payload["contents"][0]["parts"][0]["inlineData"]["data"],
        TINY_PNG_BASE64
    );
    let schema = &payload["generationConfig"]["responseSchema"];
    assert_eq!(schema["type"], "OBJECT");
    assert!(!schema.to_string().contains("$ref"));
    assert_eq!(
        payload["generationConfig"]["responseMimeType"],
        "application/json"
    );
}

#[tokio::test]
async fn test_transient_failures_then_success() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Timeout { timeout_secs: 5 }),
        Ok(TransportResponse::new(503, "overloaded")),
        Ok(TransportResponse::new(200, CANNED_ANALYSIS_BODY)),
    ]);
    let app = router(state_with_transport(transport.clone()));

    let (status, body) = send(app, json_request("/analyze-objects", &analysis_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "a cat");
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_repeated_upstream_failure_is_500() {
    let transport = ScriptedTransport::always(500, r#"{"error":"boom"}"#, 3);
    let app = router(state_with_transport(transport.clone()));

    let (status, body) = send(app, json_request("/analyze-objects", &analysis_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("HTTP 500"));
    assert!(detail.contains("boom"));
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_malformed_json_text_not_retried() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"this is prose"}]}}]}"#;
    let transport = ScriptedTransport::always(200, body, 3);
    let app = router(state_with_transport(transport.clone()));

    let (status, response) = send(app, json_request("/analyze-objects", &analysis_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response["error_type"], "upstream_content_error");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_missing_api_key_fixed_500() {
    let app = router(AppState::new_for_test());

    let (status, body) = send(app, json_request("/analyze-objects", &analysis_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], MISSING_API_KEY_MESSAGE);
}

#[tokio::test]
async fn test_invalid_mime_rejected_before_outbound_call() {
    let transport = ScriptedTransport::always(200, CANNED_ANALYSIS_BODY, 1);
    let app = router(state_with_transport(transport.clone()));

    let request = json!({"file_data": TINY_PNG_BASE64, "file_type": "text/plain"});
    let (status, body) = send(app, json_request("/analyze-objects", &request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("file_type"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_unparseable_body_without_key_is_fixed_500() {
    let app = router(AppState::new_for_test());

    let (status, body) = send(
        app,
        raw_request("/analyze-objects", "application/json", "{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], MISSING_API_KEY_MESSAGE);
}

#[tokio::test]
async fn test_unparseable_body_with_key_is_json_400() {
    let transport = ScriptedTransport::always(200, CANNED_ANALYSIS_BODY, 1);
    let app = router(state_with_transport(transport.clone()));

    let (status, body) = send(
        app,
        raw_request("/analyze-objects", "application/json", "{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
    assert!(body["detail"].is_string());
    assert_eq!(transport.call_count(), 0);
}
