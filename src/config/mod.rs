// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration
//!
//! Every option can be given as a flag or through the environment (a `.env`
//! file is loaded first by the binary).

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::api::PipelineSettings;
use crate::detection::{CategoryMapper, DEFAULT_TOP_K};
use crate::vision::image_utils::MAX_IMAGE_SIZE;
use crate::vision::{DecodeParams, DetectorConfig};

/// Detection triage node
#[derive(Parser, Debug, Clone)]
#[command(name = "binsort-node")]
#[command(version)]
#[command(about = "Classify the main object in an image and map it to a waste bin", long_about = None)]
pub struct NodeConfig {
    /// Pre-shared key clients send in the x-api-key header
    #[arg(long, env = "YOLO_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Address to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "API_PORT", default_value_t = 8000)]
    pub port: u16,

    /// YOLOv8 ONNX model
    #[arg(long, env = "MODEL_PATH", default_value = "./models/yolov8n.onnx")]
    pub model_path: String,

    /// Newline-delimited class names (COCO-80 when unset)
    #[arg(long, env = "CLASS_NAMES_PATH")]
    pub class_names_path: Option<String>,

    /// TOML label-to-bin table (built-in table when unset)
    #[arg(long, env = "CATEGORY_TABLE_PATH")]
    pub category_table_path: Option<String>,

    #[arg(long, env = "CONFIDENCE_THRESHOLD", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, env = "IOU_THRESHOLD", default_value_t = 0.45)]
    pub iou_threshold: f32,

    #[arg(long, env = "MAX_DETECTIONS", default_value_t = 300)]
    pub max_detections: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "DETECTOR_THREADS", default_value_t = 4)]
    pub detector_threads: usize,

    /// Maximum alternative classifications per response
    #[arg(long, env = "TOP_K", default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Abort detection after this many seconds
    #[arg(long, env = "DETECT_TIMEOUT_SECS")]
    pub detect_timeout_secs: Option<u64>,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = MAX_IMAGE_SIZE)]
    pub max_upload_bytes: usize,
}

impl NodeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("API key must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "Confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(format!(
                "IoU threshold must be within [0, 1], got {}",
                self.iou_threshold
            ));
        }
        if self.top_k == 0 {
            return Err("TOP_K must be greater than 0".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("Upload limit must be greater than 0".to_string());
        }
        if self.detect_timeout_secs == Some(0) {
            return Err("Detection timeout must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            model_path: self.model_path.clone(),
            class_names_path: self.class_names_path.clone(),
            params: DecodeParams {
                confidence_threshold: self.confidence_threshold,
                iou_threshold: self.iou_threshold,
                max_detections: self.max_detections,
            },
            intra_threads: self.detector_threads,
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            api_key: self.api_key.clone(),
            top_k: self.top_k,
            detect_timeout: self.detect_timeout_secs.map(Duration::from_secs),
            max_upload_bytes: self.max_upload_bytes,
        }
    }

    pub fn load_categories(&self) -> Result<CategoryMapper> {
        match self.category_table_path {
            Some(ref path) => CategoryMapper::from_toml_file(path)
                .with_context(|| format!("Failed to load category table {}", path)),
            None => Ok(CategoryMapper::default()),
        }
    }
}
