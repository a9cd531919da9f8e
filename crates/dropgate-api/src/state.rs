//! Shared application state handed to every handler.

use crate::captcha::CaptchaVerifier;
use crate::services::upload::UploadService;
use std::sync::Arc;
use std::time::Duration;

/// Limits applied to each upload request.
#[derive(Clone, Copy, Debug)]
pub struct UploadSettings {
    /// Ceiling on CAPTCHA verification plus streaming every file of one request.
    pub timeout: Duration,
    /// Proxies in front of the server whose `X-Forwarded-For` entries are trusted.
    pub trusted_proxy_count: usize,
}

pub struct AppState {
    pub upload: UploadService,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub settings: UploadSettings,
    /// Index page with the site key already substituted.
    pub index_page: String,
}
