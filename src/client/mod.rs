//! Database API on top of the pool.
//!
//! # Data Flow
//! ```text
//! caller (query text / line protocol, already built)
//!     → InfluxClient builds a LogicalRequest (/query or /write)
//!     → Pool::json or Pool::discard
//!     → raw JSON results or ()
//! ```
//!
//! # Design Decisions
//! - Credentials ride on every request as `u` / `p` query parameters
//! - Query text and line protocol are passed through untouched
//! - Statement errors reported inside a 200 body surface as `ClientError::Statement`
//! - User, privilege, continuous query and retention policy statements live in admin.rs

pub mod admin;

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::config::{ClusterConfig, ConfigError};
use crate::health::probe::PingStats;
use crate::pool::{LogicalRequest, Pool, PoolError};
use crate::transport::{HttpTransport, Transport};

pub use admin::{Privilege, RetentionPolicyOptions};

pub const QUERY_PATH: &str = "/query";
pub const WRITE_PATH: &str = "/write";

/// Timestamp precision used by writes when none is given.
pub const DEFAULT_WRITE_PRECISION: &str = "n";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("no database specified and no default database configured")]
    NoDatabase,

    /// The server accepted the request but a statement failed.
    #[error("statement failed: {0}")]
    Statement(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Options for reads through `/query`.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Overrides the configured default database.
    pub database: Option<String>,
    pub retention_policy: Option<String>,
    /// Epoch precision for returned timestamps (`n`, `u`, `ms`, `s`, `m`, `h`).
    pub precision: Option<String>,
}

/// Options for `/write`.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub database: Option<String>,
    pub precision: String,
    pub retention_policy: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            database: None,
            precision: DEFAULT_WRITE_PRECISION.to_string(),
            retention_policy: None,
        }
    }
}

/// Client for one database cluster.
#[derive(Debug, Clone)]
pub struct InfluxClient<T: Transport = HttpTransport> {
    pool: Pool<T>,
    database: Option<String>,
    username: String,
    password: String,
}

impl InfluxClient<HttpTransport> {
    pub fn new(config: ClusterConfig) -> Result<Self, ConfigError> {
        let pool = Pool::new(&config.hosts, &config.pool)?;
        Ok(Self::with_pool(config, pool))
    }
}

impl<T: Transport> InfluxClient<T> {
    /// Use an existing pool; only credentials and the default database are
    /// taken from `config`.
    pub fn with_pool(config: ClusterConfig, pool: Pool<T>) -> Self {
        Self {
            pool,
            database: config.database,
            username: config.username,
            password: config.password,
        }
    }

    pub fn pool(&self) -> &Pool<T> {
        &self.pool
    }

    /// Run a read query and return the server's JSON verbatim.
    pub async fn query_raw(&self, query: &str, options: &QueryOptions) -> ClientResult<Value> {
        let database = self.resolve_database(options.database.as_deref())?;
        let request = self
            .query_request(LogicalRequest::get(QUERY_PATH))
            .param("db", database)
            .param_opt("epoch", options.precision.as_deref())
            .param("q", query)
            .param_opt("rp", options.retention_policy.as_deref());
        Ok(self.pool.json(&request).await?)
    }

    /// Run several read statements in one request.
    pub async fn query_raw_many(
        &self,
        queries: &[&str],
        options: &QueryOptions,
    ) -> ClientResult<Value> {
        self.query_raw(&queries.join(";"), options).await
    }

    /// Run a mutating statement (`POST /query`).
    pub async fn execute(&self, query: &str, database: Option<&str>) -> ClientResult<Value> {
        self.statement(query, database.or(self.database.as_deref())).await
    }

    /// Write a line protocol payload.
    pub async fn write_points(&self, payload: &str, options: &WriteOptions) -> ClientResult<()> {
        let database = self.resolve_database(options.database.as_deref())?;
        let request = LogicalRequest::post(WRITE_PATH)
            .param("db", database)
            .param("p", self.password.as_str())
            .param("precision", options.precision.as_str())
            .param_opt("rp", options.retention_policy.as_deref())
            .param("u", self.username.as_str())
            .body(payload);
        Ok(self.pool.discard(&request).await?)
    }

    pub async fn create_database(&self, name: &str) -> ClientResult<()> {
        self.statement(&format!("create database {}", quote_identifier(name)), None)
            .await
            .map(|_| ())
    }

    pub async fn drop_database(&self, name: &str) -> ClientResult<()> {
        self.statement(&format!("drop database {}", quote_identifier(name)), None)
            .await
            .map(|_| ())
    }

    /// Ping every host. See [`Pool::ping`].
    pub async fn ping(&self, timeout: Duration) -> Vec<PingStats> {
        self.pool.ping(timeout).await
    }

    /// `POST /query` with `db` only when given, then check every statement.
    async fn statement(&self, query: &str, database: Option<&str>) -> ClientResult<Value> {
        let request = self
            .query_request(LogicalRequest::post(QUERY_PATH))
            .param_opt("db", database)
            .param("q", query);
        let results: Value = self.pool.json(&request).await?;
        check_statements(&results)?;
        Ok(results)
    }

    fn query_request(&self, request: LogicalRequest) -> LogicalRequest {
        request
            .param("p", self.password.as_str())
            .param("u", self.username.as_str())
    }

    fn resolve_database<'a>(&'a self, explicit: Option<&'a str>) -> ClientResult<&'a str> {
        explicit
            .or(self.database.as_deref())
            .ok_or(ClientError::NoDatabase)
    }
}

/// Double-quote an identifier, escaping `"` and `\`.
pub fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Single-quote a string literal, escaping `'` and `\`.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

fn check_statements(results: &Value) -> ClientResult<()> {
    if let Some(error) = results.get("error").and_then(Value::as_str) {
        return Err(ClientError::Statement(error.to_string()));
    }
    let statements = results.get("results").and_then(Value::as_array);
    for statement in statements.into_iter().flatten() {
        if let Some(error) = statement.get("error").and_then(Value::as_str) {
            return Err(ClientError::Statement(error.to_string()));
        }
    }
    Ok(())
}
