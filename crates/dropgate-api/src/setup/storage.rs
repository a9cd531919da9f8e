//! Storage backend setup

use anyhow::{Context, Result};
use dropgate_core::Config;
use dropgate_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    create_storage(config)
        .await
        .with_context(|| format!("Failed to set up {} storage backend", config.storage_backend()))
}
