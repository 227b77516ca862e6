//! Client address resolution for per-client limits

use std::net::IpAddr;

use axum::http::HeaderMap;

const FORWARDED_HEADERS: [&str; 2] = ["x-forwarded-for", "x-real-ip"];

/// Address of the client behind any reverse proxy
///
/// The first entry of `X-Forwarded-For` wins, then `X-Real-IP`, then the
/// socket peer. Unparseable header values are skipped.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>) -> Option<IpAddr> {
    FORWARDED_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name)?.to_str().ok())
        .find_map(|value| value.split(',').next()?.trim().parse().ok())
        .or(peer)
}

/// Rate-limit key for a request; requests with no known address share one
pub fn client_key(headers: &HeaderMap, peer: Option<IpAddr>) -> String {
    client_ip(headers, peer)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
