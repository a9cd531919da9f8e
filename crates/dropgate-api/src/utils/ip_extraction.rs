//! Client address extraction for the CAPTCHA `remoteip` hint
//!
//! `X-Forwarded-For` is only consulted when the deployment declares trusted
//! proxies in front of it; otherwise the header is client-controlled and the
//! direct peer address is used.

use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

/// Resolve the caller's address.
///
/// # Arguments
/// * `headers` - HTTP request headers
/// * `socket_addr` - Direct peer address, when the server recorded one
/// * `trusted_proxy_count` - Number of trusted proxies/load balancers in front
///
/// Returns `None` when no trustworthy address is available.
pub fn client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> Option<IpAddr> {
    if trusted_proxy_count > 0 {
        let from_header = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| from_forwarded_for(value, trusted_proxy_count));
        if from_header.is_some() {
            return from_header;
        }
    }

    socket_addr.map(|addr| addr.ip())
}

/// Pick the client entry out of `client, proxy1, proxy2, ...`.
fn from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<IpAddr> {
    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    // Each trusted proxy appends the address it received the request from,
    // so the client sits `trusted_proxy_count` entries from the end.
    let pos = ips.len().checked_sub(trusted_proxy_count)?;
    ips.get(pos)?.parse().ok()
}
