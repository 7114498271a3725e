// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /detect end to end through the router

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use vision_relay::{api::errors::DETECTOR_UNAVAILABLE_MESSAGE, AppState};

use super::common::{
    multipart_request, png_bytes, raw_request, router, send, state_with_detector,
};

#[tokio::test]
async fn test_detects_and_annotates() {
    let app = router(state_with_detector());

    let (status, body) = send(app, multipart_request("file", "cat.png", &png_bytes(32, 24))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Image analyzed successfully.");
    assert_eq!(body["filename"], "cat.png");

    let results = body["detection_results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["class_name"], "cat");
    assert_eq!(results[0]["box"], serde_json::json!([0, 0, 1, 1]));

    let annotated = STANDARD
        .decode(body["annotated_image_base64"].as_str().unwrap())
        .unwrap();
    assert_eq!(&annotated[..3], &[0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn test_undecodable_bytes_are_400() {
    let app = router(state_with_detector());

    let (status, body) = send(app, multipart_request("file", "junk.bin", b"not an image at all")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("detection_results").is_none());
    assert!(body["detail"].as_str().unwrap().contains("Could not decode image file"));
}

#[tokio::test]
async fn test_missing_file_field_is_400() {
    let app = router(state_with_detector());

    let (status, body) = send(app, multipart_request("image", "cat.png", &png_bytes(4, 4))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");
}

#[tokio::test]
async fn test_detector_unavailable_is_503() {
    let app = router(AppState::new_for_test());

    let (status, body) = send(app, multipart_request("file", "cat.png", &png_bytes(4, 4))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], DETECTOR_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn test_detector_unavailable_checked_before_body() {
    let app = router(AppState::new_for_test());

    let (status, body) = send(app, raw_request("/detect", "application/json", "{}")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], DETECTOR_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn test_non_multipart_body_is_json_400() {
    let app = router(state_with_detector());

    let (status, body) = send(app, raw_request("/detect", "application/json", "{}")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "invalid_request");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Expected a multipart form upload"));
}
