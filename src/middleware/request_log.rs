//! Request logging middleware
//!
//! Runs first for every inbound request. Buffers the body once, parses it as
//! JSON and logs method, URL, headers and body. The parsed body is handed to
//! later stages as a [`JsonBody`] extension so it is never parsed twice.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use http_body_util::LengthLimitError;
use serde_json::Value;
use tracing::{info, warn};

use crate::{error::AppError, proxy::headers::redact_headers, AppState};

/// Parsed JSON body of the inbound request
///
/// `None` when the body is empty, is not valid JSON, or was not sent with a
/// JSON content type.
#[derive(Debug, Clone, Default)]
pub struct JsonBody(pub Option<Value>);

impl JsonBody {
    /// Parse raw body bytes, treating empty or invalid input as no body
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self(None);
        }
        Self(serde_json::from_slice(bytes).ok())
    }

    /// Parse the body only when `headers` declare a JSON content type
    pub fn from_request(headers: &HeaderMap, bytes: &[u8]) -> Self {
        if is_json_content_type(headers) {
            Self::parse(bytes)
        } else {
            Self(None)
        }
    }

    /// The `model` field, when present and a string
    pub fn model(&self) -> Option<&str> {
        self.0.as_ref()?.get("model")?.as_str()
    }
}

/// `application/json` or any `+json` suffix type, parameters ignored
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Request logging middleware
///
/// Never rejects a request except when the body exceeds the configured size
/// limit, which is answered with 413 before any other processing.
pub async fn log_request_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let limit = state.config.max_body_bytes;
    let bytes = to_bytes(body, limit).await.map_err(|e| {
        let inner = e.into_inner();
        if inner.is::<LengthLimitError>() {
            warn!(limit = limit, "Request body too large");
            AppError::PayloadTooLarge { limit }
        } else {
            AppError::BadRequest(format!("Failed to read request body: {}", inner))
        }
    })?;

    let json_body = JsonBody::from_request(&parts.headers, &bytes);
    let logged_body = json_body
        .0
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_default();

    info!(method = %parts.method, url = %parts.uri, "Incoming request");
    info!(headers = ?redact_headers(&parts.headers), "Headers");
    info!(
        body = %logged_body,
        "Body"
    );

    parts.extensions.insert(json_body);
    let request = Request::from_parts(parts, Body::from(bytes));

    Ok(next.run(request).await)
}
