//! Health check endpoint
//!
//! `GET /health` reports version, uptime and whether both secrets are
//! configured. A missing secret degrades the status but still answers 200,
//! since the process itself is alive and serving.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Health status enum
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Which secrets were found at startup
#[derive(Debug, Serialize)]
pub struct SecretChecks {
    pub upstream_api_key: bool,
    pub proxy_key: bool,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: SecretChecks,
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let checks = SecretChecks {
        upstream_api_key: state.upstream.is_configured(),
        proxy_key: state.config.proxy_key.is_some(),
    };

    let status = if checks.upstream_api_key && checks.proxy_key {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        checks,
    };

    (StatusCode::OK, Json(response))
}
