//! Outcome classification.
//!
//! # Classification
//! ```text
//! transport error                 → TransportFailure (retry elsewhere, cool host down)
//! 5xx                             → TransportFailure (host up but cannot serve)
//! 2xx                             → Success
//! anything else (4xx, 3xx, ...)   → ApplicationFailure (request rejected, no retry)
//! ```

use reqwest::header::HeaderMap;
use url::Url;

use crate::transport::{RawResponse, TransportError};

/// A successful response, tagged with the host that produced it.
#[derive(Debug, Clone)]
pub struct Response {
    pub host: Url,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub(crate) fn from_raw(host: &Url, raw: RawResponse) -> Self {
        Self {
            host: host.clone(),
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
        }
    }
}

/// The classified result of one attempt.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success(RawResponse),
    TransportFailure(TransportError),
    ApplicationFailure { status: u16, body: String },
}

impl Outcome {
    pub fn classify(result: Result<RawResponse, TransportError>) -> Self {
        let raw = match result {
            Ok(raw) => raw,
            Err(error) => return Outcome::TransportFailure(error),
        };

        match raw.status {
            200..=299 => Outcome::Success(raw),
            500..=599 => Outcome::TransportFailure(TransportError::Unavailable {
                status: raw.status,
                body: raw.body,
            }),
            status => Outcome::ApplicationFailure {
                status,
                body: raw.body,
            },
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "success",
            Outcome::TransportFailure(_) => "transport_failure",
            Outcome::ApplicationFailure { .. } => "application_failure",
        }
    }
}
