// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict_annotated endpoint tests

use axum::http::StatusCode;
use std::sync::Arc;

use crate::common::*;

#[tokio::test]
async fn test_annotated_returns_jpeg() {
    let detector = Arc::new(FixedDetector::fruit(vec![
        raw([2.0, 2.0, 8.0, 8.0], 0, 0.9),
        raw([10.0, 10.0, 50.0, 40.0], 1, 0.8),
    ]));

    let response = send(
        test_app(detector.clone()),
        png_upload("/predict_annotated", Some(API_KEY), "banana.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(
        response.headers()["content-disposition"],
        "inline; filename=\"annotated_banana.png\""
    );

    let jpeg = body_bytes(response).await;
    assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);

    let decoded = image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn test_annotated_no_detections_returns_204() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));

    let response = send(
        test_app(detector),
        png_upload("/predict_annotated", Some(API_KEY), "empty.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_annotated_wrong_key_returns_401() {
    let detector = Arc::new(FixedDetector::fruit(vec![raw([0.0, 0.0, 10.0, 10.0], 1, 0.9)]));

    let response = send(
        test_app(detector.clone()),
        png_upload("/predict_annotated", Some("nope"), "a.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_annotated_missing_file_returns_400() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));
    let request = upload_request(
        "/predict_annotated",
        Some(API_KEY),
        &[Part::text("comment", "nothing attached")],
    );

    let response = send(test_app(detector), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "No file uploaded");
}
