// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod auth;
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod pipeline;
pub mod predict;

pub use auth::{credential_from_headers, verify_api_key, API_KEY_HEADER};
pub use errors::{ApiError, ErrorResponse};
pub use handlers::{HealthResponse, ModelSummary};
pub use http_server::{create_app, start_server, AppState};
pub use pipeline::{
    DetectionPipeline, Detected, PipelineError, PipelineSettings, SelectedObject, Triage, Upload,
    ValidatedUpload,
};
pub use predict::{ClassificationResponse, Detections, MainObjectSummary};
