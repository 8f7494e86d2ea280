// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 ONNX detection model
//!
//! Runs an Ultralytics YOLOv8 export (`yolo export format=onnx`) on CPU
//! through ONNX Runtime.

use anyhow::{Context, Result};
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use super::postprocess::{decode_output, DecodeParams};
use super::preprocessing::{letterbox, YOLO_INPUT_SIZE};
use crate::detection::RawDetections;
use crate::vision::detector::{Detector, DetectorError};

/// YOLOv8 object detector backed by an ONNX Runtime session
///
/// The session is not re-entrant, so concurrent requests take turns on it.
pub struct YoloDetector {
    /// ONNX Runtime session (single owner at a time)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Model identifier (file stem)
    name: String,
    /// Class-id to label table
    class_names: Arc<[String]>,
    /// Decode thresholds
    params: DecodeParams,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("name", &self.name)
            .field("input_name", &self.input_name)
            .field("classes", &self.class_names.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detection model from a file
    ///
    /// # Arguments
    /// - `model_path`: Path to the ONNX model file
    /// - `class_names`: Label table matching the model's class head
    /// - `params`: Confidence/IoU thresholds and detection cap
    /// - `intra_threads`: ONNX Runtime intra-op thread count
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        class_names: Arc<[String]>,
        params: DecodeParams,
        intra_threads: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(output) = session.outputs.first() {
            debug!(
                "Detection model output {}: {:?}",
                output.name, output.output_type
            );
        }

        let name = model_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("yolo")
            .to_string();

        info!(
            "✅ Detection model {} loaded ({} classes, CPU-only)",
            name,
            class_names.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            name,
            class_names,
            params,
        })
    }
}

impl Detector for YoloDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn class_names(&self) -> Arc<[String]> {
        self.class_names.clone()
    }

    fn detect(&self, image: &DynamicImage) -> Result<RawDetections, DetectorError> {
        let started = Instant::now();
        let (input, placement) = letterbox(image, YOLO_INPUT_SIZE);

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectorError::SessionPoisoned)?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;

        let detections = decode_output(
            output_tensor.view(),
            self.class_names.len(),
            &placement,
            &self.params,
        )?;

        debug!(
            "Detected {} objects in {}ms",
            detections.len(),
            started.elapsed().as_millis()
        );

        Ok(RawDetections {
            detections,
            class_names: self.class_names.clone(),
        })
    }
}
