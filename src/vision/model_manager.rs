// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector loading at process startup

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;

use crate::vision::detector::{coco_class_names, load_class_names, Detector};
use crate::vision::yolo::{DecodeParams, YoloDetector};

/// Configuration for loading the detection model
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Newline-delimited class names (COCO-80 when absent)
    pub class_names_path: Option<String>,
    /// Decode thresholds
    pub params: DecodeParams,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: "./models/yolov8n.onnx".to_string(),
            class_names_path: None,
            params: DecodeParams::default(),
            intra_threads: 4,
        }
    }
}

/// Information about the loaded detector
#[derive(Debug, Clone, Serialize)]
pub struct DetectorInfo {
    /// Model name
    pub name: String,
    /// Number of classes the model predicts
    pub classes: usize,
}

impl DetectorInfo {
    pub fn of(detector: &dyn Detector) -> Self {
        Self {
            name: detector.name().to_string(),
            classes: detector.class_names().len(),
        }
    }
}

/// Load the detector described by `config`
///
/// Fails when the class table or the model cannot be loaded; callers treat
/// that as fatal.
pub fn load_detector(config: &DetectorConfig) -> Result<Arc<dyn Detector>> {
    let class_names = match config.class_names_path {
        Some(ref path) => load_class_names(path)?,
        None => coco_class_names(),
    };

    let detector = YoloDetector::new(
        &config.model_path,
        class_names,
        config.params,
        config.intra_threads,
    )
    .with_context(|| format!("Cannot start without detection model {}", config.model_path))?;

    Ok(Arc::new(detector))
}
