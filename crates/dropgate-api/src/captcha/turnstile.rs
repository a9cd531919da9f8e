use super::{CaptchaError, CaptchaVerifier};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SiteverifyResponse {
    success: bool,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

/// Cloudflare Turnstile siteverify client
pub struct TurnstileVerifier {
    http_client: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl TurnstileVerifier {
    pub fn new(secret: String, verify_url: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for Turnstile verification")?;

        Ok(Self {
            http_client,
            secret,
            verify_url,
        })
    }
}

#[async_trait]
impl CaptchaVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str, client_address: Option<&str>) -> Result<(), CaptchaError> {
        if token.is_empty() {
            return Err(CaptchaError::MissingToken);
        }

        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(address) = client_address {
            form.push(("remoteip", address));
        }

        let response = self
            .http_client
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptchaError::ServiceStatus(status.as_u16()));
        }

        let body: SiteverifyResponse = response.json().await?;
        if !body.success {
            return Err(CaptchaError::Rejected(if body.error_codes.is_empty() {
                "unspecified".to_string()
            } else {
                body.error_codes.join(", ")
            }));
        }

        tracing::debug!("Turnstile token accepted");
        Ok(())
    }
}
