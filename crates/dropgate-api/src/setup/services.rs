//! Collaborator wiring

use crate::captcha::TurnstileVerifier;
use crate::handlers::index::render_index;
use crate::services::upload::UploadService;
use crate::state::{AppState, UploadSettings};
use anyhow::Result;
use dropgate_core::Config;
use dropgate_storage::Storage;
use std::sync::Arc;

pub fn initialize_services(config: &Config, storage: Arc<dyn Storage>) -> Result<Arc<AppState>> {
    let captcha = TurnstileVerifier::new(
        config.turnstile_secret().to_string(),
        config.turnstile_verify_url().to_string(),
        config.turnstile_timeout(),
    )?;

    Ok(Arc::new(AppState {
        upload: UploadService::new(storage),
        captcha: Arc::new(captcha),
        settings: UploadSettings {
            timeout: config.upload_timeout(),
            trusted_proxy_count: config.trusted_proxy_count(),
        },
        index_page: render_index(config.turnstile_site_key()),
    }))
}
