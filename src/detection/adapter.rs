// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Normalizes raw detector output into a `DetectionSet`

use std::sync::Arc;
use thiserror::Error;

use super::{BoundingBox, Candidate, DetectionSet, Scoring};

/// One detection as emitted by a detector, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Box corners `[x1, y1, x2, y2]` in original image pixels
    pub bbox: [f32; 4],
    /// Index into the detector's class-name table
    pub class_id: i64,
    /// Score of the winning class
    pub score: f32,
    /// Full per-class distribution, when the detector provides one
    pub class_scores: Option<Vec<f32>>,
}

/// Everything a detector produced for one image
#[derive(Debug, Clone)]
pub struct RawDetections {
    pub detections: Vec<RawDetection>,
    pub class_names: Arc<[String]>,
}

#[derive(Debug, Error, PartialEq)]
pub enum AdaptationError {
    #[error("detection {index}: box coordinates are not finite: {bbox:?}")]
    NonFiniteBox { index: usize, bbox: [f32; 4] },

    #[error("detection {index}: box has no area: {bbox:?}")]
    InvertedBox { index: usize, bbox: [f32; 4] },

    #[error("detection {index}: class id {class_id} outside class table of {classes} names")]
    ClassOutOfRange {
        index: usize,
        class_id: i64,
        classes: usize,
    },

    #[error("detection {index}: confidence {score} is not within [0, 1]")]
    InvalidConfidence { index: usize, score: f32 },

    #[error("detection {index}: class distribution has {actual} entries, expected {expected}")]
    DistributionLength {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("detection {index}: class distribution contains an invalid probability")]
    InvalidProbability { index: usize },

    #[error("detector returned detections without a class-name table")]
    EmptyClassTable,
}

/// Validate raw detector output and convert it into a `DetectionSet`
///
/// Candidate order follows the detector's order. Any malformed detection
/// rejects the whole output.
pub fn adapt(raw: RawDetections) -> Result<DetectionSet, AdaptationError> {
    let RawDetections {
        detections,
        class_names,
    } = raw;

    if !detections.is_empty() && class_names.is_empty() {
        return Err(AdaptationError::EmptyClassTable);
    }

    let classes = class_names.len();
    let candidates = detections
        .into_iter()
        .enumerate()
        .map(|(index, detection)| adapt_one(index, detection, classes))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DetectionSet::new(candidates, class_names))
}

fn adapt_one(
    index: usize,
    detection: RawDetection,
    classes: usize,
) -> Result<Candidate, AdaptationError> {
    let RawDetection {
        bbox,
        class_id,
        score,
        class_scores,
    } = detection;

    if bbox.iter().any(|v| !v.is_finite()) {
        return Err(AdaptationError::NonFiniteBox { index, bbox });
    }
    let [x1, y1, x2, y2] = bbox;
    if x2 <= x1 || y2 <= y1 {
        return Err(AdaptationError::InvertedBox { index, bbox });
    }

    let class_id = usize::try_from(class_id)
        .ok()
        .filter(|id| *id < classes)
        .ok_or(AdaptationError::ClassOutOfRange {
            index,
            class_id,
            classes,
        })?;

    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(AdaptationError::InvalidConfidence { index, score });
    }

    let scoring = match class_scores {
        None => Scoring::Scalar { confidence: score },
        Some(probabilities) => {
            if probabilities.len() != classes {
                return Err(AdaptationError::DistributionLength {
                    index,
                    expected: classes,
                    actual: probabilities.len(),
                });
            }
            if probabilities
                .iter()
                .any(|p| !p.is_finite() || !(0.0..=1.0).contains(p))
            {
                return Err(AdaptationError::InvalidProbability { index });
            }
            Scoring::Distribution {
                confidence: score,
                probabilities,
            }
        }
    };

    Ok(Candidate {
        bbox: BoundingBox::new(x1, y1, x2, y2),
        class_id,
        scoring,
    })
}
