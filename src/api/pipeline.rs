// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request pipeline
//!
//! Every prediction request passes through the same ordered stages:
//!
//! 1. authenticate - the pre-shared key must match
//! 2. validate - a file must be present, non-empty and of an accepted type
//! 3. detect - decode and run the detector on a blocking worker
//! 4. select - pick the main object, or report that nothing was found
//!
//! A failing stage stops the request; later stages never run. The caller
//! then builds the response from the selected object, either as
//! classification JSON ([`DetectionPipeline::classify`]) or as an annotated
//! image ([`DetectionPipeline::annotate`]).

use bytes::Bytes;
use image::DynamicImage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::auth::verify_api_key;
use crate::api::errors::ApiError;
use crate::api::predict::{ClassificationResponse, MainObjectSummary};
use crate::detection::{
    adapt, rank_alternatives, select_main, AdaptationError, CategoryMapper, DetectionSet,
    MainObject, DEFAULT_TOP_K,
};
use crate::vision::image_utils::{decode_image_bytes, is_accepted_upload, ImageError, MAX_IMAGE_SIZE};
use crate::vision::{AnnotationRenderer, Detector, DetectorError, DetectorInfo, RenderError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid or missing API key")]
    Unauthorized,

    #[error("{0}")]
    InvalidUpload(String),

    #[error("Invalid image: {0}")]
    Image(#[from] ImageError),

    #[error("Malformed detector output: {0}")]
    Adaptation(#[from] AdaptationError),

    #[error("{0}")]
    Detector(#[from] DetectorError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("Detection timed out after {0:?}")]
    Timeout(Duration),

    #[error("Detection worker failed: {0}")]
    WorkerFailed(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Unauthorized => {
                ApiError::Unauthorized("Invalid or missing API key".to_string())
            }
            PipelineError::InvalidUpload(message) => ApiError::ValidationError {
                field: "file".to_string(),
                message,
            },
            other => ApiError::InvalidRequest(other.to_string()),
        }
    }
}

/// Per-deployment pipeline settings
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Pre-shared key clients must present
    pub api_key: String,
    /// Maximum number of alternative classifications
    pub top_k: usize,
    /// Upper bound on a single detector call
    pub detect_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
}

impl PipelineSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            top_k: DEFAULT_TOP_K,
            detect_timeout: None,
            max_upload_bytes: MAX_IMAGE_SIZE,
        }
    }
}

/// A file part as received from the client
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// An upload that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    file_name: String,
    bytes: Bytes,
}

impl ValidatedUpload {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

/// Decoded image together with its validated detections
#[derive(Debug)]
pub struct Detected {
    file_name: String,
    image: DynamicImage,
    set: DetectionSet,
}

/// The request's main object and the context needed to respond
#[derive(Debug)]
pub struct SelectedObject {
    file_name: String,
    image: DynamicImage,
    set: DetectionSet,
    index: usize,
    label: String,
}

impl SelectedObject {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn main_object(&self) -> MainObject<'_> {
        MainObject {
            index: self.index,
            candidate: &self.set.candidates()[self.index],
            label: &self.label,
            class_names: self.set.class_names(),
        }
    }
}

/// Outcome of stages 1-4
#[derive(Debug)]
pub enum Triage {
    /// The detector found nothing; clients receive 204
    NoDetection,
    Selected(SelectedObject),
}

pub struct DetectionPipeline {
    detector: Arc<dyn Detector>,
    categories: Arc<CategoryMapper>,
    renderer: Arc<AnnotationRenderer>,
    settings: PipelineSettings,
}

impl DetectionPipeline {
    pub fn new(
        detector: Arc<dyn Detector>,
        categories: Arc<CategoryMapper>,
        renderer: Arc<AnnotationRenderer>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            detector,
            categories,
            renderer,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn detector_info(&self) -> DetectorInfo {
        DetectorInfo::of(self.detector.as_ref())
    }

    pub fn authenticate(&self, credential: Option<&str>) -> Result<(), PipelineError> {
        if verify_api_key(&self.settings.api_key, credential) {
            Ok(())
        } else {
            warn!("Rejected request with invalid or missing API key");
            Err(PipelineError::Unauthorized)
        }
    }

    pub fn validate(&self, upload: Option<Upload>) -> Result<ValidatedUpload, PipelineError> {
        let upload =
            upload.ok_or_else(|| PipelineError::InvalidUpload("No file uploaded".to_string()))?;

        if upload.bytes.is_empty() {
            return Err(PipelineError::InvalidUpload(
                "Uploaded file is empty".to_string(),
            ));
        }

        if !is_accepted_upload(upload.file_name.as_deref(), upload.content_type.as_deref()) {
            return Err(PipelineError::InvalidUpload(
                "Invalid file type. Only PNG and JPEG images are accepted".to_string(),
            ));
        }

        if upload.bytes.len() > self.settings.max_upload_bytes {
            return Err(ImageError::TooLarge(upload.bytes.len(), self.settings.max_upload_bytes).into());
        }

        Ok(ValidatedUpload {
            file_name: upload.file_name.unwrap_or_else(|| "upload".to_string()),
            bytes: upload.bytes,
        })
    }

    /// Decode the upload and run the detector off the async runtime
    pub async fn detect(&self, upload: ValidatedUpload) -> Result<Detected, PipelineError> {
        let started = Instant::now();
        let detector = self.detector.clone();
        let max_bytes = self.settings.max_upload_bytes;
        let bytes = upload.bytes;

        let worker = tokio::task::spawn_blocking(move || {
            let (image, info) = decode_image_bytes(&bytes, max_bytes)?;
            debug!(
                "Decoded {}x{} {:?} image ({} bytes)",
                info.width, info.height, info.format, info.size_bytes
            );
            let raw = detector.detect(&image)?;
            Ok::<_, PipelineError>((image, raw))
        });

        // A timed-out worker keeps running until the detector returns
        let joined = match self.settings.detect_timeout {
            Some(limit) => tokio::time::timeout(limit, worker)
                .await
                .map_err(|_| PipelineError::Timeout(limit))?,
            None => worker.await,
        };
        let (image, raw) = joined.map_err(|e| PipelineError::WorkerFailed(e.to_string()))??;

        let set = adapt(raw)?;
        debug!(
            "Detector returned {} candidates in {:?}",
            set.len(),
            started.elapsed()
        );

        Ok(Detected {
            file_name: upload.file_name,
            image,
            set,
        })
    }

    pub fn select(&self, detected: Detected) -> Triage {
        let Detected {
            file_name,
            image,
            set,
        } = detected;

        let (index, label) = match select_main(&set) {
            Some(main) => (main.index, main.label.to_string()),
            None => {
                info!("No objects detected in {}", file_name);
                return Triage::NoDetection;
            }
        };

        Triage::Selected(SelectedObject {
            file_name,
            image,
            set,
            index,
            label,
        })
    }

    /// Stages 2-4 for a request that has already been authenticated
    pub async fn triage_upload(&self, upload: Option<Upload>) -> Result<Triage, PipelineError> {
        let validated = self.validate(upload)?;
        let detected = self.detect(validated).await?;
        Ok(self.select(detected))
    }

    /// Stages 1-4
    pub async fn triage(
        &self,
        credential: Option<&str>,
        upload: Option<Upload>,
    ) -> Result<Triage, PipelineError> {
        self.authenticate(credential)?;
        self.triage_upload(upload).await
    }

    pub fn classify(&self, selected: &SelectedObject) -> ClassificationResponse {
        let main = selected.main_object();
        let bin = self.categories.map_to_category(main.label);
        let alternatives = rank_alternatives(&main, self.settings.top_k);

        info!(
            "Main object in {}: {} ({:.3}) -> {}",
            selected.file_name,
            main.label,
            main.confidence(),
            bin
        );

        ClassificationResponse::new(MainObjectSummary {
            class_name: main.label.to_string(),
            confidence: main.confidence(),
            bin: bin.to_string(),
            alternative_classifications: alternatives,
        })
    }

    /// Render the main object onto the upload as JPEG
    pub fn annotate(&self, selected: &SelectedObject) -> Result<Vec<u8>, PipelineError> {
        let main = selected.main_object();
        let jpeg = self
            .renderer
            .render_annotated(&selected.image, main.candidate, main.label)?;
        info!(
            "Annotated {} with {} ({} bytes)",
            selected.file_name,
            main.label,
            jpeg.len()
        );
        Ok(jpeg)
    }
}
