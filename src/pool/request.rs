//! Logical request description.
//!
//! A logical request is built once and reused unchanged for every attempt;
//! only the target host differs between retries.

use std::fmt;
use std::time::Duration;

/// HTTP method of a logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read-only request.
    Get,
    /// Mutating request (writes, DDL).
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }

    pub fn is_mutating(self) -> bool {
        matches!(self, Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters whose values never appear in logs.
const REDACTED_PARAMS: &[&str] = &["p", "password"];

/// Method, path, ordered query parameters, optional body and timeout.
#[derive(Clone, PartialEq, Eq)]
pub struct LogicalRequest {
    method: Method,
    path: String,
    query: Vec<(String, Option<String>)>,
    body: Option<String>,
    timeout: Option<Duration>,
}

impl LogicalRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn param(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.param_opt(key, Some(value))
    }

    /// Add a parameter that is omitted from the URL when `value` is `None`.
    pub fn param_opt<V: Into<String>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.query.push((key.into(), value.map(Into::into)));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Per-attempt timeout overriding host and pool defaults.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Parameters with a value, in insertion order.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
    }

    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for LogicalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<(&str, &str)> = self
            .query_pairs()
            .map(|(k, v)| {
                if REDACTED_PARAMS.contains(&k) {
                    (k, "***")
                } else {
                    (k, v)
                }
            })
            .collect();
        f.debug_struct("LogicalRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &query)
            .field("body_len", &self.body.as_ref().map(String::len))
            .field("timeout", &self.timeout)
            .finish()
    }
}
