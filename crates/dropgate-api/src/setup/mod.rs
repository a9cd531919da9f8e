//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod health;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use dropgate_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    if config.upload_timeout() >= config.read_timeout() {
        tracing::warn!(
            upload_timeout_secs = config.upload_timeout().as_secs(),
            read_timeout_secs = config.read_timeout().as_secs(),
            "Upload deadline is not shorter than the body read timeout"
        );
    }

    let storage = storage::setup_storage(config).await?;
    let state = services::initialize_services(config, storage)?;
    let router = routes::build_router(state.clone(), config.read_timeout());

    Ok((state, router))
}
