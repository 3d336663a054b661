//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration for a clustered database client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Default database used when an operation does not name one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Username sent as the `u` query parameter.
    pub username: String,

    /// Password sent as the `p` query parameter.
    pub password: String,

    /// Database nodes, in configuration order.
    pub hosts: Vec<HostConfig>,

    /// Failover and timeout tuning.
    pub pool: PoolConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            database: None,
            username: "root".to_string(),
            password: "root".to_string(),
            hosts: vec![HostConfig::default()],
            pool: PoolConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// A single database node.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Transport scheme ("http" or "https").
    pub protocol: String,

    /// Hostname or IP address.
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Per-host transport options.
    pub options: HostOptions,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8086,
            options: HostOptions::default(),
        }
    }
}

impl HostConfig {
    /// Convenience constructor with default options.
    pub fn new(protocol: &str, host: &str, port: u16) -> Self {
        Self {
            protocol: protocol.to_string(),
            host: host.to_string(),
            port,
            options: HostOptions::default(),
        }
    }

    /// The base address requests for this host are resolved against.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        // Bare IPv6 literals need brackets inside a URL authority.
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        Url::parse(&format!("{}://{}:{}", self.protocol, host, self.port))
    }
}

/// Transport options applied to every request sent to one host.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct HostOptions {
    /// Request timeout override for this host in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Skip certificate verification for https hosts.
    pub accept_invalid_certs: bool,
}

impl HostOptions {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Failover policy for the host pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum attempts per logical request. Defaults to the host count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<usize>,

    /// Default per-attempt timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Consecutive failures before a host enters its cool-down window.
    pub failure_threshold: u32,

    /// Path probed by the health prober.
    pub probe_path: String,

    /// Cool-down growth settings.
    pub backoff: BackoffConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            request_timeout_ms: 30_000,
            failure_threshold: 1,
            probe_path: "/ping".to_string(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl PoolConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Exponential cool-down configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackoffConfig {
    /// Cool-down after the first failure, in milliseconds.
    pub base_ms: u64,

    /// Multiplier applied per additional consecutive failure.
    pub growth_factor: f64,

    /// Upper bound on any single cool-down, in milliseconds.
    pub max_ms: u64,

    /// Fraction (0.0 to 1.0) of the delay added at random.
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: 300,
            growth_factor: 2.0,
            max_ms: 10_000,
            jitter: 0.0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
