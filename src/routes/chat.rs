//! Gated chat completions proxy
//!
//! Handles every request under `/api` once it has passed the access gate:
//! sanitizes message content and forwards the body to the upstream
//! completions endpoint, whatever path the client called.

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::{HeaderMap, Method},
    response::Response,
    Extension,
};
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    error::AppError, middleware::request_log::JsonBody, proxy::RequestContext,
    sanitize::sanitize_body, AppState,
};

/// Proxy handler for all `/api` requests
///
/// 1. The request logger has parsed the body (middleware)
/// 2. The access gate has admitted the request (middleware)
/// 3. Non-system message content is trimmed
/// 4. The body is forwarded upstream and the response relayed unchanged
pub async fn proxy_chat_completions(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    method: Method,
    headers: HeaderMap,
    Extension(JsonBody(body)): Extension<JsonBody>,
) -> Result<Response, AppError> {
    // The gate only admits bodies with a model, so an object is always present here
    let body = body.unwrap_or_else(|| Value::Object(Map::new()));
    let model = body.get("model").and_then(Value::as_str);

    let ctx = RequestContext::new(uri.path()).with_model(model);

    info!(
        trace_id = %ctx.trace_id,
        method = %method,
        path = %uri.path(),
        model = ?ctx.model,
        "Processing proxied request"
    );

    let sanitized = sanitize_body(&body);

    let response = state
        .upstream
        .forward(&ctx, method, &headers, &sanitized)
        .await?;

    info!(
        trace_id = %ctx.trace_id,
        status = %response.status(),
        duration_ms = %ctx.elapsed_ms(),
        "Proxied request completed"
    );

    Ok(response)
}
