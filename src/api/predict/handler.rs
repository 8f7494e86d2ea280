// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handlers

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};

use super::request::read_upload;
use super::response::annotated_file_name;
use crate::api::auth::credential_from_headers;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::api::pipeline::{PipelineError, Triage};
use crate::vision::ANNOTATED_MIME_TYPE;

/// POST /predict - Classify the main object in an uploaded image
///
/// Returns 200 with the main object, 204 when nothing was detected.
pub async fn predict_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    match triage_request(&state, &headers, multipart).await? {
        Triage::NoDetection => Ok(StatusCode::NO_CONTENT.into_response()),
        Triage::Selected(selected) => Ok(Json(state.pipeline.classify(&selected)).into_response()),
    }
}

/// POST /predict_annotated - Return the upload with the main object drawn on it
///
/// Returns 200 with a JPEG body, 204 when nothing was detected.
pub async fn predict_annotated_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let selected = match triage_request(&state, &headers, multipart).await? {
        Triage::NoDetection => return Ok(StatusCode::NO_CONTENT.into_response()),
        Triage::Selected(selected) => selected,
    };

    let disposition = format!(
        "inline; filename=\"{}\"",
        annotated_file_name(selected.file_name())
    );
    let pipeline = state.pipeline.clone();
    let jpeg = tokio::task::spawn_blocking(move || pipeline.annotate(&selected))
        .await
        .map_err(|e| PipelineError::WorkerFailed(e.to_string()))??;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, ANNOTATED_MIME_TYPE)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(jpeg))
        .map_err(|e| ApiError::InternalError(e.to_string()))
}

/// Authenticate before touching the body, then validate, detect and select
async fn triage_request(
    state: &AppState,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Triage, ApiError> {
    state
        .pipeline
        .authenticate(credential_from_headers(headers))?;
    let upload = read_upload(multipart, state.pipeline.settings().max_upload_bytes).await?;
    Ok(state.pipeline.triage_upload(upload).await?)
}
