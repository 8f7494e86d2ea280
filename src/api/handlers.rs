// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, http::Uri, Json};
use serde::{Deserialize, Serialize};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::version;
use crate::vision::DetectorInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSummary>,
}

/// Loaded model as reported by /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    pub classes: usize,
}

impl From<DetectorInfo> for ModelSummary {
    fn from(info: DetectorInfo) -> Self {
        Self {
            name: info.name,
            classes: info.classes,
        }
    }
}

/// GET /health - Liveness check, no authentication
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION.to_string(),
        model: Some(state.pipeline.detector_info().into()),
    })
}

pub async fn not_found_handler(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}
