//! Access gate middleware
//!
//! Admits a request only when it carries the proxy access key in the `auro`
//! header and asks for a model on the allow-list.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, instrument};

use crate::{
    error::AppError, middleware::request_log::JsonBody, proxy::headers::ACCESS_KEY_HEADER,
    AppState,
};

/// Extract the caller-supplied proxy key from the `auro` header
pub fn extract_access_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ACCESS_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
}

/// Decide whether a request may pass the gate
///
/// The supplied key must be non-empty and equal to the configured key, and
/// the model must be on the allow-list. An unconfigured key admits nothing.
pub fn is_authorized(
    supplied_key: Option<&str>,
    expected_key: Option<&str>,
    model: Option<&str>,
    allowed_models: &HashSet<String>,
) -> bool {
    let key_ok = match (supplied_key, expected_key) {
        (Some(supplied), Some(expected)) => !supplied.is_empty() && supplied == expected,
        _ => false,
    };
    let model_ok = model.map_or(false, |m| allowed_models.contains(m));

    key_ok && model_ok
}

/// Access gate middleware
///
/// Relies on the [`JsonBody`] extension inserted by the request logger.
/// Bad key and bad model are both answered with the same 401.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn access_gate_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let model = request
        .extensions()
        .get::<JsonBody>()
        .and_then(JsonBody::model);

    if !is_authorized(
        extract_access_key(request.headers()),
        state.config.proxy_key.as_deref(),
        model,
        &state.config.allowed_models,
    ) {
        return Err(AppError::Unauthorized);
    }

    debug!(model = ?model, "Request admitted");

    Ok(next.run(request).await)
}
