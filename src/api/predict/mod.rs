// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction API endpoint module
//!
//! Provides POST /predict (classification JSON) and POST /predict_annotated
//! (annotated JPEG). Both take a multipart upload with a `file` field.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{predict_annotated_handler, predict_handler};
pub use request::{read_upload, FILE_FIELD};
pub use response::{annotated_file_name, ClassificationResponse, Detections, MainObjectSummary};
