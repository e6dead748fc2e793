//! Header utilities for upstream proxying
//!
//! Ensures the caller's proxy key and credentials are never forwarded to the
//! upstream gateway, and that hop-by-hop headers are dropped in both
//! directions.

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::error::{AppError, AppResult};

/// Header carrying the caller's proxy access key
pub const ACCESS_KEY_HEADER: HeaderName = HeaderName::from_static("auro");

/// Hop-by-hop headers that must never be forwarded
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Inbound headers replaced or recomputed on the outbound request
const REPLACED_HEADERS: &[HeaderName] = &[
    header::HOST,
    header::CONTENT_LENGTH,
    header::AUTHORIZATION,
];

/// Check if a header is a hop-by-hop header that should not be forwarded
pub fn is_hop_by_hop_header(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(name)
}

/// Check if a header is owned by the gateway and must not be copied upstream
pub fn is_replaced_header(name: &HeaderName) -> bool {
    REPLACED_HEADERS.contains(name) || *name == ACCESS_KEY_HEADER
}

/// Build the outbound header set for an upstream request
///
/// Client headers are carried over except hop-by-hop headers and the ones
/// the gateway owns. `Authorization` and `Content-Length` are set from the
/// upstream key and the serialized body length.
pub fn build_upstream_headers(
    incoming: &HeaderMap,
    api_key: &str,
    content_length: usize,
) -> AppResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in incoming {
        if is_hop_by_hop_header(name) || is_replaced_header(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    let authorization = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
        AppError::ServiceUnavailable("OPENAI_KEY is not a valid header value".to_string())
    })?;
    headers.insert(header::AUTHORIZATION, authorization);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));

    Ok(headers)
}

/// Filter hop-by-hop headers from an upstream response
pub fn filter_response_headers(response_headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();

    for (name, value) in response_headers {
        if !is_hop_by_hop_header(name) {
            filtered.append(name.clone(), value.clone());
        }
    }

    filtered
}

/// Copy of `headers` with credential values masked, for logging
pub fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut redacted = headers.clone();
    for name in [ACCESS_KEY_HEADER, header::AUTHORIZATION] {
        if redacted.contains_key(&name) {
            redacted.insert(name, HeaderValue::from_static("[redacted]"));
        }
    }
    redacted
}
