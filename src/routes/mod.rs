//! HTTP routes for the gateway
//!
//! This module defines all HTTP endpoints exposed by the proxy.

pub mod chat;
pub mod health;
pub mod root;

use std::sync::Arc;

use axum::{
    extract::OriginalUri,
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    middleware::{auth::access_gate_middleware, request_log::log_request_middleware},
    AppState,
};

/// Prefix under which requests are gated, sanitized and forwarded
pub const PROTECTED_PREFIX: &str = "/api";

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Everything under /api is gated, whatever the method or sub-path
    let protected_routes = Router::new()
        .route(PROTECTED_PREFIX, any(chat::proxy_chat_completions))
        // The wildcard needs at least one character, so the bare trailing slash gets its own route
        .route("/api/", any(chat::proxy_chat_completions))
        .route("/api/*rest", any(chat::proxy_chat_completions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            access_gate_middleware,
        ));

    // Public routes - no gate
    let public_routes = Router::new()
        .route("/", get(root::root))
        .route("/health", get(health::health_check));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        // Global middleware (applied to all routes); the logger runs before anything else
        .layer(middleware::from_fn_with_state(
            state.clone(),
            log_request_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
