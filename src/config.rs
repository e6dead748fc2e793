//! Configuration management for the gateway
//!
//! Configuration is loaded once from environment variables at startup and
//! never re-read while the process is running.

use std::collections::HashSet;
use std::env;

use anyhow::{Context, Result};

/// Models that may be requested through the gateway unless overridden
pub const DEFAULT_ALLOWED_MODELS: &[&str] = &["gryphe/mythomist-7b", "gryphe/mythomax-l2-13b"];

/// Default upstream gateway base URL
pub const DEFAULT_UPSTREAM_URL: &str = "https://openrouter.ai";

/// 50 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,

    /// Upstream gateway base URL (scheme + host, no trailing slash)
    pub upstream_url: String,
    /// Credential sent upstream as `Authorization: Bearer <key>`
    pub upstream_api_key: Option<String>,
    /// Upstream request timeout (in seconds)
    pub upstream_timeout_seconds: u64,

    /// Key callers must present in the `auro` header
    pub proxy_key: Option<String>,
    /// Models callers are allowed to request
    pub allowed_models: HashSet<String>,

    /// Maximum accepted inbound body size (in bytes)
    pub max_body_bytes: usize,

    /// Identifier of the hosting space, used to announce the public URL
    pub space_id: Option<String>,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed_models = match lookup("GATEWAY_ALLOWED_MODELS") {
            Some(list) => parse_model_list(&list),
            None => DEFAULT_ALLOWED_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        Ok(Self {
            host: lookup("GATEWAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("GATEWAY_PORT")
                .unwrap_or_else(|| "7860".to_string())
                .parse()
                .context("Invalid GATEWAY_PORT")?,

            upstream_url: lookup("GATEWAY_UPSTREAM_URL")
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            upstream_api_key: non_empty(lookup("OPENAI_KEY")),
            upstream_timeout_seconds: lookup("GATEWAY_UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|| "300".to_string())
                .parse()
                .context("Invalid GATEWAY_UPSTREAM_TIMEOUT_SECS")?,

            proxy_key: non_empty(lookup("PROXY_KEY")),
            allowed_models,

            max_body_bytes: match lookup("GATEWAY_MAX_BODY_BYTES") {
                Some(v) => v.parse().context("Invalid GATEWAY_MAX_BODY_BYTES")?,
                None => DEFAULT_MAX_BODY_BYTES,
            },

            space_id: non_empty(lookup("SPACE_ID")),

            log_format: match lookup("GATEWAY_LOG_FORMAT").as_deref() {
                Some("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        })
    }

    /// Publicly reachable base URL derived from the space identifier
    ///
    /// `owner/my_space` becomes `https://owner-my-space.hf.space/api/v1`.
    /// Returns `None` when no usable identifier is configured.
    pub fn external_url(&self) -> Option<String> {
        let space_id = self.space_id.as_deref()?;
        let mut parts = space_id.split('/');
        let owner = parts.next()?;
        let space = parts.next()?;
        Some(format!(
            "https://{}-{}.hf.space/api/v1",
            owner,
            space.replace('_', "-")
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_model_list(list: &str) -> HashSet<String> {
    list.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
