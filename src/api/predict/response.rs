// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::detection::AlternativeClassification;

/// The main object as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainObjectSummary {
    /// Class label
    #[serde(rename = "class")]
    pub class_name: String,
    /// Detector score for the selected box (0.0-1.0)
    ///
    /// Taken as-is from the model. It is not rescaled against the other
    /// classes, so it need not equal this label's share of the distribution
    /// behind `alternative_classifications`.
    pub confidence: f32,
    /// Disposal category for the label
    pub bin: String,
    /// Runner-up labels with probabilities from the box's class distribution,
    /// normalised to sum to 1 over all classes
    pub alternative_classifications: Vec<AlternativeClassification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detections {
    pub main_object: MainObjectSummary,
}

/// Response body for POST /predict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub detections: Detections,
}

impl ClassificationResponse {
    pub fn new(main_object: MainObjectSummary) -> Self {
        Self {
            detections: Detections { main_object },
        }
    }
}

/// File name offered in Content-Disposition for an annotated upload
pub fn annotated_file_name(upload_name: &str) -> String {
    let base = Path::new(upload_name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let base: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    if base.is_empty() {
        "annotated_upload".to_string()
    } else {
        format!("annotated_{}", base)
    }
}
