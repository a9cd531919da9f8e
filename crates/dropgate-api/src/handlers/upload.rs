//! Multipart upload endpoint

use crate::constants::TURNSTILE_TOKEN_HEADER;
use crate::error::HttpAppError;
use crate::services::upload::{PartReader, UploadSession};
use crate::state::AppState;
use crate::utils::ip_extraction::client_ip;
use crate::utils::session_id::new_session_id;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, Method},
    response::{IntoResponse, Response},
};
use dropgate_core::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Stand-in deadline when the configured timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Accept a multipart form and store every file part under a fresh session prefix.
///
/// Request-shape and CAPTCHA problems reject the whole request. Once files
/// start streaming, per-file failures are counted and the response reports
/// how many were stored.
#[tracing::instrument(skip_all, fields(method = %request.method()))]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, HttpAppError> {
    if request.method() != Method::POST {
        return Err(AppError::MethodNotAllowed("Only POST allowed".to_string()).into());
    }

    let boundary = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|content_type| multer::parse_boundary(content_type).ok())
        .filter(|boundary| !boundary.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Invalid Content-Type".to_string()))?;

    let now = Instant::now();
    let deadline = now
        .checked_add(state.settings.timeout)
        .unwrap_or_else(|| now + FAR_FUTURE);

    let token = request
        .headers()
        .get(TURNSTILE_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_ip(
        request.headers(),
        peer.as_ref(),
        state.settings.trusted_proxy_count,
    )
    .map(|ip| ip.to_string());

    match timeout_at(deadline, state.captcha.verify(&token, client.as_deref())).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            return Err(AppError::CaptchaFailed(err.to_string()).into());
        }
        Err(_) => {
            return Err(AppError::RequestTimeout("Upload timed out".to_string()).into());
        }
    }

    let session = UploadSession::new(new_session_id(chrono::Utc::now()), deadline);
    let parts = PartReader::new(request.into_body().into_data_stream(), boundary);

    let outcome = state.upload.run(session, parts).await;
    Ok(outcome.into_response())
}
