//! Upstream gateway client
//!
//! Forwards accepted requests to the single canonical chat completions
//! endpoint of the upstream gateway and relays its response verbatim.

use axum::body::Body;
use axum::http::{HeaderMap, Method, Response, StatusCode};
use serde_json::Value;
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    proxy::{
        headers::{build_upstream_headers, filter_response_headers},
        logging::RequestContext,
    },
};

/// Path every accepted request is forwarded to, whatever the inbound path
pub const UPSTREAM_COMPLETIONS_PATH: &str = "/api/v1/chat/completions";

/// Client for the upstream LLM gateway
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl UpstreamClient {
    /// Create a new upstream client
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.upstream_url.clone(),
            api_key: config.upstream_api_key.clone(),
        }
    }

    /// Check if the client is configured with an API key
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL requests are forwarded to
    pub fn completions_url(&self) -> String {
        format!("{}{}", self.base_url, UPSTREAM_COMPLETIONS_PATH)
    }

    /// Forward `body` upstream and relay the response
    ///
    /// The body is serialized once; `Content-Length` is its exact byte length.
    /// Transport failures surface as [`AppError::HttpError`]; upstream error
    /// statuses are relayed like any other response.
    #[instrument(skip_all, fields(trace_id = %ctx.trace_id, method = %method))]
    pub async fn forward(
        &self,
        ctx: &RequestContext,
        method: Method,
        incoming_headers: &HeaderMap,
        body: &Value,
    ) -> AppResult<Response<Body>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("OPENAI_KEY is not configured".to_string())
        })?;

        let url = self.completions_url();
        let payload = serde_json::to_vec(body)?;

        let headers = build_upstream_headers(incoming_headers, api_key, payload.len())?;
        ctx.log_headers_prepared(headers.len());
        ctx.log_upstream_request(&url, &String::from_utf8_lossy(&payload));

        let response = self
            .client
            .request(method, &url)
            .headers(headers)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                ctx.log_connection_error(&e.to_string(), &url);
                e
            })?;

        ctx.log_upstream_response(response.status().as_u16(), response.content_length());

        self.convert_response(response)
    }

    /// Convert reqwest response to axum response
    fn convert_response(&self, response: reqwest::Response) -> AppResult<Response<Body>> {
        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut builder = Response::builder().status(status);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(filter_response_headers(response.headers()));
        }

        // Stream the body
        let body = Body::from_stream(response.bytes_stream());

        builder
            .body(body)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build response: {}", e)))
    }
}
