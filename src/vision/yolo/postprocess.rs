// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of YOLOv8-style detection heads
//!
//! The exported head emits one column per anchor: `cx, cy, w, h` in model
//! input pixels followed by one sigmoid score per class. Exports differ in
//! whether anchors are the last (`[1, 4+C, N]`) or middle (`[1, N, 4+C]`)
//! axis; both layouts are accepted.

use ndarray::{ArrayViewD, Ix3};

use super::preprocessing::Letterbox;
use crate::detection::{BoundingBox, RawDetection};
use crate::vision::detector::DetectorError;

/// Thresholds applied while decoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeParams {
    /// Minimum winning-class score to keep a box
    pub confidence_threshold: f32,
    /// Same-class boxes overlapping more than this are suppressed
    pub iou_threshold: f32,
    /// Upper bound on boxes returned per image
    pub max_detections: usize,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 300,
        }
    }
}

/// Decode a raw head tensor into detections in original image pixels
///
/// Output is ordered by descending score after class-wise NMS.
pub fn decode_output(
    output: ArrayViewD<'_, f32>,
    classes: usize,
    letterbox: &Letterbox,
    params: &DecodeParams,
) -> Result<Vec<RawDetection>, DetectorError> {
    let shape = output.shape().to_vec();
    let output = output
        .into_dimensionality::<Ix3>()
        .map_err(|_| DetectorError::OutputShape {
            shape: shape.clone(),
            reason: "expected a rank-3 tensor".to_string(),
        })?;

    let channels = 4 + classes;
    let head = if shape[1] == channels {
        output.index_axis_move(ndarray::Axis(0), 0)
    } else if shape[2] == channels {
        output.index_axis_move(ndarray::Axis(0), 0).reversed_axes()
    } else {
        return Err(DetectorError::OutputShape {
            shape,
            reason: format!("no axis of size {} (4 box values + {} classes)", channels, classes),
        });
    };

    // head is [channels, anchors]
    let anchors = head.shape()[1];
    let mut candidates: Vec<RawDetection> = Vec::new();

    for anchor in 0..anchors {
        let column = head.column(anchor);
        let scores: Vec<f32> = column
            .iter()
            .skip(4)
            .map(|s| if s.is_finite() { s.clamp(0.0, 1.0) } else { 0.0 })
            .collect();

        let Some((class_id, score)) = best_class(&scores) else {
            continue;
        };
        if score < params.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        let (x1, y1) = letterbox.to_original(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_original(cx + w / 2.0, cy + h / 2.0);
        if !(x2 > x1 && y2 > y1) {
            continue;
        }

        candidates.push(RawDetection {
            bbox: [x1, y1, x2, y2],
            class_id: class_id as i64,
            score,
            class_scores: Some(normalize(&scores)),
        });
    }

    Ok(non_max_suppression(candidates, params))
}

/// Highest score and its class; the first class wins ties
fn best_class(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (id, score)| match best {
            Some((_, best_score)) if score <= best_score => best,
            _ => Some((id, score)),
        })
}

/// Rescale per-class sigmoid scores so they sum to 1
fn normalize(scores: &[f32]) -> Vec<f32> {
    let total: f32 = scores.iter().sum();
    if total <= 0.0 {
        return vec![0.0; scores.len()];
    }
    scores.iter().map(|s| (s / total).clamp(0.0, 1.0)).collect()
}

/// Greedy class-wise NMS, highest score first
pub fn non_max_suppression(
    mut detections: Vec<RawDetection>,
    params: &DecodeParams,
) -> Vec<RawDetection> {
    detections.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<RawDetection> = Vec::new();
    for detection in detections {
        if kept.len() >= params.max_detections {
            break;
        }
        let bbox = to_box(&detection.bbox);
        let suppressed = kept.iter().any(|k| {
            k.class_id == detection.class_id && to_box(&k.bbox).iou(&bbox) > params.iou_threshold
        });
        if !suppressed {
            kept.push(detection);
        }
    }
    kept
}

fn to_box(bbox: &[f32; 4]) -> BoundingBox {
    BoundingBox::new(bbox[0], bbox[1], bbox[2], bbox[3])
}
