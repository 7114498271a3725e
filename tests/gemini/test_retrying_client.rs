// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GeminiClient over real HTTP against a mock server

use mockito::{Matcher, Server};
use serde_json::json;
use vision_relay::{
    config::GeminiConfig,
    gemini::{ChatTurn, GenerateContentRequest, Part, Role},
    GeminiClient, GeminiError,
};

const ENDPOINT: &str = "/models/gemini-test:generateContent";

fn config(base_url: String) -> GeminiConfig {
    GeminiConfig {
        api_key: Some("secret".to_string()),
        model: "gemini-test".to_string(),
        base_url,
        max_retries: 3,
        initial_delay_ms: 1,
        request_timeout_secs: 5,
    }
}

fn hello() -> GenerateContentRequest {
    GenerateContentRequest::from_turns(vec![ChatTurn::new(Role::User, vec![Part::text("hello")])], None)
}

#[tokio::test]
async fn test_text_reply_over_http() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
        .match_body(Matcher::PartialJson(json!({
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"hi there"}]}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let client = GeminiClient::new(&config(server.url())).unwrap();
    let text = client.generate_text(&hello()).await.unwrap();

    assert_eq!(text, "hi there");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_json_reply_over_http() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"{\"ok\":true}"}]}}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(&config(server.url())).unwrap();
    let value = client.generate_json(&hello()).await.unwrap();

    assert_eq!(value, json!({"ok": true}));
}

#[tokio::test]
async fn test_persistent_503_exhausts_attempts() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("model overloaded")
        .expect(3)
        .create_async()
        .await;

    let client = GeminiClient::new(&config(server.url())).unwrap();
    let err = client.generate_text(&hello()).await.unwrap_err();

    match err {
        GeminiError::UpstreamTransport { attempts, detail } => {
            assert_eq!(attempts, 3);
            assert!(detail.contains("HTTP 503"));
            assert!(detail.contains("model overloaded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_trailing_slash_base_url() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", ENDPOINT)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"ok"}]}}]}"#)
        .create_async()
        .await;

    let client = GeminiClient::new(&config(format!("{}/", server.url()))).unwrap();
    assert_eq!(client.generate_text(&hello()).await.unwrap(), "ok");
}

#[test]
fn test_missing_key_rejected_at_construction() {
    let mut cfg = config("http://localhost".to_string());
    cfg.api_key = None;
    assert!(matches!(GeminiClient::new(&cfg), Err(GeminiError::MissingApiKey)));
}
