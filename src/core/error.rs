// src/core/error.rs

use std::time::Duration;
use thiserror::Error;

/// Problems with what the caller asked for. These are raised before any
/// request leaves the process, so the engine never sees them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("URL '{0}' has no scheme (expected http:// or https://)")]
    MissingScheme(String),

    #[error("unsupported scheme '{scheme}' in URL '{url}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("URL '{0}' has no host")]
    MissingHost(String),

    #[error("unsupported HTTP method '{0}'")]
    UnsupportedMethod(String),

    #[error("invalid rule '{0}' (expected KEY=DESCRIPTION)")]
    InvalidRuleSpec(String),
}

/// Failures raised by the HTTP client adapter. A target that produces one of
/// these is skipped entirely; no partial report is built.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timeout after {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("Could not connect: {0}")]
    Connect(String),

    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("Invalid redirect target '{location}': {reason}")]
    InvalidRedirect { location: String, reason: String },

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Scan aborted: {0}")]
    Aborted(String),
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else if err.is_builder() {
            TransportError::Client(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
