// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum::http::StatusCode;
use axum_extra::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use tracing::{debug, warn};

use crate::api::errors::ApiError;
use crate::api::pipeline::Upload;

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

/// Read the `file` part from a multipart body
///
/// Other fields are skipped. Returns `Ok(None)` when no `file` part exists,
/// leaving the missing-file decision to the pipeline. `max_upload_bytes` is
/// only used to explain a body that hit the router's size limit.
pub async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    max_upload_bytes: usize,
) -> Result<Option<Upload>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        ApiError::InvalidRequest(format!("Expected a multipart/form-data body: {}", e))
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_upload_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_upload_bytes))?;

        return Ok(Some(Upload {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}

fn multipart_error(err: MultipartError, max_upload_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected upload over the body limit");
        return ApiError::InvalidRequest(format!(
            "Upload too large: the limit is {} bytes",
            max_upload_bytes
        ));
    }
    ApiError::InvalidRequest(format!("Invalid multipart body: {}", err.body_text()))
}
