// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detection via ONNX Runtime
//!
//! Components:
//! - `preprocessing` - letterbox resize into the model input tensor
//! - `postprocess` - head decoding and class-wise NMS
//! - `model` - session wrapper implementing `Detector`

pub mod model;
pub mod postprocess;
pub mod preprocessing;

pub use model::YoloDetector;
pub use postprocess::{decode_output, non_max_suppression, DecodeParams};
pub use preprocessing::{letterbox, Letterbox, YOLO_INPUT_SIZE};
