//! Client identity derivation.
//!
//! Precedence: leftmost `X-Forwarded-For` entry (the original client) →
//! `X-Real-IP` → raw peer address. Missing headers are never an error; the
//! chain just falls through.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Derive the rate-limiting key for a request.
pub fn client_key(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }

    peer.ip().to_string()
}
