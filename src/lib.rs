// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod detection;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState, DetectionPipeline, PipelineSettings};
pub use config::NodeConfig;
pub use detection::{
    adapt, rank_alternatives, select_main, BoundingBox, Candidate, CategoryMapper, DetectionSet,
    Scoring,
};
pub use vision::{AnnotationRenderer, AnnotationStyle, Detector};
