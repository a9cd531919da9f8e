//! Liveness probe

/// Process is up and serving requests.
pub async fn healthz() -> &'static str {
    "OK"
}
