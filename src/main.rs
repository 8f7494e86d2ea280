// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use binsort_node::{
    api::{start_server, AppState, DetectionPipeline},
    config::NodeConfig,
    version,
    vision::{load_detector, AnnotationRenderer, AnnotationStyle},
};
use clap::Parser;
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 BUILD VERSION: {}", version::VERSION);

    let config = NodeConfig::parse();
    config.validate().map_err(|e| anyhow!(e))?;
    let addr = config.listen_addr()?;

    info!("🧠 Loading detection model from {}", config.model_path);
    let detector = load_detector(&config.detector_config())?;
    info!(
        "✅ Detector {} ready ({} classes)",
        detector.name(),
        detector.class_names().len()
    );

    let categories = config.load_categories()?;
    info!(
        "🗑️  {} labels mapped to bins, default bin {}",
        categories.len(),
        categories.default_category()
    );

    let renderer = AnnotationRenderer::new(AnnotationStyle::default())?;

    let pipeline = DetectionPipeline::new(
        detector,
        Arc::new(categories),
        Arc::new(renderer),
        config.pipeline_settings(),
    );

    start_server(addr, AppState::new(pipeline)).await?;

    info!("👋 Node stopped");
    Ok(())
}
