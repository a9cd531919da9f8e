//! CAPTCHA verification
//!
//! The upload handler only sees the [`CaptchaVerifier`] trait; the production
//! implementation talks to Cloudflare Turnstile.

mod turnstile;

pub use turnstile::TurnstileVerifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("missing CAPTCHA token")]
    MissingToken,

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("verification service returned {0}")]
    ServiceStatus(u16),

    #[error("verification request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Validates a client-presented challenge token.
///
/// Any `Err` is a verification failure; callers do not distinguish causes
/// beyond logging them.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, token: &str, client_address: Option<&str>) -> Result<(), CaptchaError>;
}
