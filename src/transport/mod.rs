//! Transport subsystem: one HTTP exchange with one host.
//!
//! # Data Flow
//! ```text
//! Pool picks a host
//!     → Transport::send(host, logical request, timeout)
//!     → http.rs (reqwest: base URL + path + query, optional body)
//!     → RawResponse { status, headers, body } | TransportError
//!     → Pool classifies the outcome
//! ```
//!
//! # Design Decisions
//! - The transport never retries and never touches host health
//! - Every call carries its own timeout
//! - Status codes are not interpreted here; classification belongs to the pool

pub mod http;
#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use thiserror::Error;

use crate::load_balancer::host::Host;
use crate::pool::request::LogicalRequest;

pub use http::HttpTransport;

/// Errors meaning a host could not be reached or could not serve the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, TLS handshake failure.
    #[error("connection failed: {0}")]
    Connect(String),

    /// No complete response within the attempt's timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The host answered with a server error status (5xx).
    #[error("host unavailable (HTTP {status}): {body}")]
    Unavailable { status: u16, body: String },

    /// Connection reset, truncated body, or other I/O failure mid-request.
    #[error("request failed: {0}")]
    Request(String),

    /// The request URL could not be built for this host.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// An unclassified HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Add a header; invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Header value as text, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The transport call: one request against one host, bounded by `timeout`.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        host: &Host,
        request: &LogicalRequest,
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}
