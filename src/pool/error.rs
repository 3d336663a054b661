//! Dispatch error definitions.

use thiserror::Error;
use url::Url;

use crate::transport::TransportError;

/// Final classification of a failed dispatch.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The host answered but rejected the request. Never retried.
    #[error("request rejected by {host} (HTTP {status}): {body}")]
    Application { host: Url, status: u16, body: String },

    /// Every candidate failed at the transport level, or no host exists.
    #[error("{}", exhausted_message(*attempts, last_error.as_ref()))]
    Exhausted {
        attempts: usize,
        last_error: Option<TransportError>,
    },

    /// A successful body could not be decoded as the requested JSON type.
    #[error("invalid JSON from {host}: {source}")]
    Decode {
        host: Url,
        #[source]
        source: serde_json::Error,
    },
}

fn exhausted_message(attempts: usize, last_error: Option<&TransportError>) -> String {
    match (attempts, last_error) {
        (0, _) => "no hosts available in pool".to_string(),
        (n, Some(error)) => format!("all {} host attempts failed, last error: {}", n, error),
        (n, None) => format!("all {} host attempts failed", n),
    }
}

impl PoolError {
    /// True when the cluster, not the request, is at fault.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, PoolError::Exhausted { .. })
    }

    pub fn is_application(&self) -> bool {
        matches!(self, PoolError::Application { .. })
    }

    /// HTTP status of an application error.
    pub fn status(&self) -> Option<u16> {
        match self {
            PoolError::Application { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for dispatch operations.
pub type PoolResult<T> = Result<T, PoolError>;
