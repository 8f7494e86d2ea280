// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based object detection
//!
//! This module provides:
//! - Upload decoding and format checks
//! - The `Detector` seam and its YOLOv8 ONNX implementation
//! - Rendering of the annotated main-object image
//!
//! Inference runs on CPU only.

pub mod detector;
pub mod image_utils;
pub mod model_manager;
pub mod render;
pub mod yolo;

pub use detector::{coco_class_names, load_class_names, Detector, DetectorError};
pub use image_utils::{decode_image_bytes, detect_format, is_accepted_upload, ImageError, ImageInfo};
pub use model_manager::{load_detector, DetectorConfig, DetectorInfo};
pub use render::{AnnotationRenderer, AnnotationStyle, RenderError, ANNOTATED_MIME_TYPE};
pub use yolo::{DecodeParams, YoloDetector};
