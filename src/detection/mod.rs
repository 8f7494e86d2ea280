// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection-result triage
//!
//! Turns raw per-image detector output into:
//! - a single main object (largest box)
//! - ranked alternative classifications for that object
//! - a coarse disposal category ("bin")
//!
//! Components:
//! - `adapter` - validates raw detector output into a `DetectionSet`
//! - `selector` - main-object selection
//! - `ranker` - runner-up classes from a class distribution
//! - `category` - label to bin lookup

pub mod adapter;
pub mod category;
pub mod ranker;
pub mod selector;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use adapter::{adapt, AdaptationError, RawDetection, RawDetections};
pub use category::{CategoryMapper, CategoryTableError, DEFAULT_CATEGORY};
pub use ranker::{rank_alternatives, AlternativeClassification, DEFAULT_TOP_K};
pub use selector::{select_main, MainObject};

/// Axis-aligned box in image pixel space (x1 < x2, y1 < y2)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box (0.0 when disjoint)
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        let intersection = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// How a detector scored a candidate
///
/// Some detectors only report the winning class score; others also emit
/// the full per-class distribution for the box.
#[derive(Debug, Clone, PartialEq)]
pub enum Scoring {
    Scalar {
        confidence: f32,
    },
    Distribution {
        confidence: f32,
        /// One probability per class id, in class-id order
        probabilities: Vec<f32>,
    },
}

impl Scoring {
    pub fn confidence(&self) -> f32 {
        match self {
            Scoring::Scalar { confidence } | Scoring::Distribution { confidence, .. } => {
                *confidence
            }
        }
    }
}

/// One detected object instance
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    pub class_id: usize,
    pub scoring: Scoring,
}

impl Candidate {
    pub fn confidence(&self) -> f32 {
        self.scoring.confidence()
    }

    pub fn area(&self) -> f32 {
        self.bbox.area()
    }
}

/// All candidates for one image plus the class-name table
///
/// Built per request by [`adapt`]; candidate order is the detector's order.
#[derive(Debug, Clone)]
pub struct DetectionSet {
    candidates: Vec<Candidate>,
    class_names: Arc<[String]>,
}

impl DetectionSet {
    pub(crate) fn new(candidates: Vec<Candidate>, class_names: Arc<[String]>) -> Self {
        Self {
            candidates,
            class_names,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn label(&self, class_id: usize) -> Option<&str> {
        self.class_names.get(class_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
