// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detector seam
//!
//! The request pipeline only sees `dyn Detector`, so the ONNX model can be
//! swapped for a substitute in tests.

use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::detection::RawDetections;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Detector inference failed: {0:#}")]
    Inference(#[from] anyhow::Error),

    #[error("Detector session is unavailable after an earlier panic")]
    SessionPoisoned,

    #[error("Unexpected detector output shape {shape:?}: {reason}")]
    OutputShape { shape: Vec<usize>, reason: String },
}

/// A loaded object-detection model
///
/// Implementations must be safe to call from several blocking workers at
/// once; models whose sessions are not re-entrant serialize internally.
pub trait Detector: Send + Sync {
    /// Model identifier for logs and health output
    fn name(&self) -> &str;

    /// Class-id to label table
    fn class_names(&self) -> Arc<[String]>;

    /// Run detection on a decoded image
    fn detect(&self, image: &DynamicImage) -> Result<RawDetections, DetectorError>;
}

/// COCO-80 labels in class-id order (YOLOv8 pretrained weights)
pub const COCO_CLASS_NAMES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// Built-in COCO-80 class table
pub fn coco_class_names() -> Arc<[String]> {
    COCO_CLASS_NAMES.iter().map(|name| name.to_string()).collect()
}

/// Load a class table from a newline-delimited file (blank lines skipped)
pub fn load_class_names<P: AsRef<Path>>(path: P) -> anyhow::Result<Arc<[String]>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        anyhow::anyhow!("Failed to read class names from {}: {}", path.display(), e)
    })?;

    let names: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        anyhow::bail!("Class names file {} is empty", path.display());
    }

    Ok(names.into())
}
