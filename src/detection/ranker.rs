// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Runner-up classes for the main object

use serde::{Deserialize, Serialize};

use super::{MainObject, Scoring};

/// Number of alternatives returned when the caller does not choose
pub const DEFAULT_TOP_K: usize = 5;

/// A runner-up class for the main object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeClassification {
    #[serde(rename = "class")]
    pub class_label: String,
    pub probability: f32,
}

/// Rank the classes the detector considered for the main object
///
/// Only candidates carrying a class distribution have alternatives. Classes
/// are ordered by descending probability; equal probabilities keep ascending
/// class-id order. The main object's own class is excluded.
pub fn rank_alternatives(main: &MainObject<'_>, top_k: usize) -> Vec<AlternativeClassification> {
    let probabilities = match &main.candidate.scoring {
        Scoring::Scalar { .. } => return Vec::new(),
        Scoring::Distribution { probabilities, .. } => probabilities,
    };

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    // stable, so ties stay in class-id order
    order.sort_by(|a, b| probabilities[*b].total_cmp(&probabilities[*a]));

    order
        .into_iter()
        .filter(|class_id| *class_id != main.candidate.class_id)
        .filter_map(|class_id| {
            main.class_names
                .get(class_id)
                .map(|label| AlternativeClassification {
                    class_label: label.clone(),
                    probability: probabilities[class_id],
                })
        })
        .take(top_k)
        .collect()
}
