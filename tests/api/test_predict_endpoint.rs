// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /predict endpoint tests
//!
//! Verifies request handling order (auth, validation, detection), the
//! classification JSON shape and the no-detection response.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use binsort_node::api::PipelineSettings;
use std::sync::Arc;

use crate::common::*;

#[tokio::test]
async fn test_predict_returns_largest_object() {
    let detector = Arc::new(FixedDetector::fruit(vec![
        raw([0.0, 0.0, 10.0, 10.0], 0, 0.95),
        raw([5.0, 5.0, 25.0, 25.0], 1, 0.55),
        raw([0.0, 0.0, 12.0, 12.0], 2, 0.90),
    ]));
    let app = test_app(detector.clone());

    let response = send(app, png_upload("/predict", Some(API_KEY), "banana.png")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );

    let json = body_json(response).await;
    let main = &json["detections"]["main_object"];
    assert_eq!(main["class"], "banana");
    assert_eq!(main["bin"], "GFT");
    assert!((main["confidence"].as_f64().unwrap() - 0.55).abs() < 1e-6);
    assert_eq!(main["alternative_classifications"], serde_json::json!([]));
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn test_predict_tie_keeps_first_candidate() {
    let detector = Arc::new(FixedDetector::fruit(vec![
        raw([0.0, 0.0, 10.0, 10.0], 2, 0.5),
        raw([20.0, 20.0, 30.0, 30.0], 1, 0.9),
    ]));

    let json = body_json(send(test_app(detector), png_upload("/predict", Some(API_KEY), "a.png")).await).await;
    assert_eq!(json["detections"]["main_object"]["class"], "cup");
}

#[tokio::test]
async fn test_predict_includes_ranked_alternatives() {
    let detector = Arc::new(FixedDetector::fruit(vec![raw_with_scores(
        [4.0, 4.0, 40.0, 40.0],
        1,
        vec![0.1, 0.6, 0.3],
    )]));

    let json = body_json(send(test_app(detector), png_upload("/predict", Some(API_KEY), "a.png")).await).await;
    let main = &json["detections"]["main_object"];
    assert_eq!(main["class"], "banana");

    let alternatives = main["alternative_classifications"].as_array().unwrap();
    assert_eq!(alternatives.len(), 2);
    assert_eq!(alternatives[0]["class"], "cup");
    assert!((alternatives[0]["probability"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(alternatives[1]["class"], "apple");
}

#[tokio::test]
async fn test_predict_top_k_limits_alternatives() {
    let detector = Arc::new(FixedDetector::fruit(vec![raw_with_scores(
        [4.0, 4.0, 40.0, 40.0],
        1,
        vec![0.1, 0.6, 0.3],
    )]));
    let settings = PipelineSettings {
        top_k: 1,
        ..PipelineSettings::new(API_KEY)
    };

    let json = body_json(
        send(
            test_app_with(detector, settings),
            png_upload("/predict", Some(API_KEY), "a.png"),
        )
        .await,
    )
    .await;
    let alternatives = json["detections"]["main_object"]["alternative_classifications"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternatives[0]["class"], "cup");
}

#[tokio::test]
async fn test_predict_unknown_label_gets_default_bin() {
    let detector = Arc::new(FixedDetector::new(
        &["spaceship"],
        vec![raw([0.0, 0.0, 10.0, 10.0], 0, 0.7)],
    ));

    let json = body_json(send(test_app(detector), png_upload("/predict", Some(API_KEY), "a.png")).await).await;
    assert_eq!(json["detections"]["main_object"]["bin"], "Restafval");
}

#[tokio::test]
async fn test_predict_no_detections_returns_204() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));

    let response = send(test_app(detector.clone()), png_upload("/predict", Some(API_KEY), "empty.png")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn test_predict_wrong_key_returns_401() {
    let detector = Arc::new(FixedDetector::fruit(vec![raw([0.0, 0.0, 10.0, 10.0], 1, 0.9)]));

    let response = send(test_app(detector.clone()), png_upload("/predict", Some("nope"), "a.png")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error_type"], "unauthorized");
    assert!(json["detail"].as_str().unwrap().contains("API key"));
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_predict_missing_key_returns_401() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));

    let response = send(test_app(detector.clone()), png_upload("/predict", None, "a.png")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_predict_auth_checked_before_body() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("x-api-key", "nope")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = send(test_app(detector), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_predict_missing_file_returns_400() {
    let detector = Arc::new(FixedDetector::fruit(vec![raw([0.0, 0.0, 10.0, 10.0], 1, 0.9)]));
    let request = upload_request("/predict", Some(API_KEY), &[Part::text("note", "hello")]);

    let response = send(test_app(detector.clone()), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["detail"], "No file uploaded");
    assert_eq!(json["details"]["field"], "file");
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_predict_rejects_unsupported_file_type() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));
    let request = upload_request(
        "/predict",
        Some(API_KEY),
        &[Part::file("notes.txt", "text/plain", b"hello".to_vec())],
    );

    let response = send(test_app(detector.clone()), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("Invalid file type"));
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_predict_rejects_non_multipart_body() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("x-api-key", API_KEY)
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = send(test_app(detector), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error_type"], "invalid_request");
}

#[tokio::test]
async fn test_predict_rejects_corrupt_image() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));
    let request = upload_request(
        "/predict",
        Some(API_KEY),
        &[Part::file("broken.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0x00, 0x01])],
    );

    let response = send(test_app(detector.clone()), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_predict_rejects_oversized_upload() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));
    let settings = PipelineSettings {
        max_upload_bytes: 32,
        ..PipelineSettings::new(API_KEY)
    };

    let response = send(
        test_app_with(detector.clone(), settings),
        png_upload("/predict", Some(API_KEY), "big.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_predict_body_over_limit_reports_size() {
    let detector = Arc::new(FixedDetector::fruit(vec![]));
    let settings = PipelineSettings {
        max_upload_bytes: 16,
        ..PipelineSettings::new(API_KEY)
    };

    let response = send(
        test_app_with(detector.clone(), settings),
        upload_request(
            "/predict",
            Some(API_KEY),
            &[Part::file("big.png", "image/png", vec![0u8; 200 * 1024])],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("too large"));
    assert_eq!(detector.calls(), 0);
}

#[tokio::test]
async fn test_predict_detector_failure_returns_400() {
    let detector = Arc::new(FixedDetector::failing("onnx session crashed"));

    let response = send(
        test_app(detector.clone()),
        png_upload("/predict", Some(API_KEY), "a.png"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error_type"], "invalid_request");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .contains("onnx session crashed"));
    assert_eq!(detector.calls(), 1);
}

#[tokio::test]
async fn test_predict_malformed_detector_output_returns_400() {
    let detector = Arc::new(FixedDetector::fruit(vec![raw([10.0, 10.0, 5.0, 20.0], 1, 0.9)]));

    let response = send(test_app(detector), png_upload("/predict", Some(API_KEY), "a.png")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("Malformed detector output"));
}
