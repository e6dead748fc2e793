//! Request logging utilities for upstream proxying
//!
//! Provides structured logging with correlation IDs so a single forwarded
//! request can be followed from arrival to relayed response.

use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Context for tracking a forwarded request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Path the client called
    pub inbound_path: String,
    /// Model requested by the client
    pub model: Option<String>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(inbound_path: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            inbound_path: inbound_path.to_string(),
            model: None,
        }
    }

    /// Set the model for this request
    pub fn with_model(mut self, model: Option<impl Into<String>>) -> Self {
        self.model = model.map(Into::into);
        self
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log the payload about to be sent upstream
    pub fn log_upstream_request(&self, url: &str, payload: &str) {
        info!(
            trace_id = %self.trace_id,
            url = %url,
            body_size = payload.len(),
            body = %payload,
            "Body being sent to API"
        );
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: u16, content_length: Option<u64>) {
        info!(
            trace_id = %self.trace_id,
            inbound_path = %self.inbound_path,
            model = ?self.model,
            status = %status,
            content_length = ?content_length,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log headers being sent (debug level)
    pub fn log_headers_prepared(&self, header_count: usize) {
        debug!(
            trace_id = %self.trace_id,
            header_count = %header_count,
            "Headers prepared for upstream request"
        );
    }

    /// Log connection error
    pub fn log_connection_error(&self, error: &str, url: &str) {
        error!(
            trace_id = %self.trace_id,
            url = %url,
            model = ?self.model,
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Connection to upstream failed"
        );
    }
}
