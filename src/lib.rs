//! Auro Gateway - minimal reverse proxy for chat completions
//!
//! This library provides the core functionality for the gateway: callers
//! present a proxy key and an allowed model, message content is trimmed, and
//! the request is forwarded to the upstream LLM gateway with the server-side
//! credential.

pub mod config;
pub mod error;
pub mod middleware;
pub mod proxy;
pub mod routes;
pub mod sanitize;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;

pub use crate::config::Config;
pub use crate::error::{AppError, AppResult};
pub use crate::proxy::UpstreamClient;

/// Application state shared across all request handlers
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub start_time: Instant,
    /// Client for the upstream LLM gateway, owning the pooled HTTP client
    pub upstream: Arc<UpstreamClient>,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config) -> Result<Self> {
        // Initialize HTTP client with connection pooling
        let http_client = reqwest::Client::builder()
            .pool_max_idle_per_host(100)
            .timeout(Duration::from_secs(config.upstream_timeout_seconds))
            .build()?;

        let upstream = Arc::new(UpstreamClient::new(http_client, &config));

        Ok(Self {
            config,
            start_time: Instant::now(),
            upstream,
        })
    }
}
