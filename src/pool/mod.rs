//! Host pool and failover dispatch.
//!
//! # Data Flow
//! ```text
//! caller builds LogicalRequest
//!     → Pool::dispatch
//!     → load_balancer (candidate order, cursor advanced once)
//!     → resilience::retries (next candidate while attempts remain)
//!     → transport call with its own timeout
//!     → response.rs classifies the outcome:
//!         success             → mark host healthy, return
//!         application failure → return immediately, host untouched
//!         transport failure   → cool host down, next candidate
//!     → candidates exhausted → PoolError::Exhausted
//! ```
//!
//! # Design Decisions
//! - Two result shapes (`json`, `discard`) share one dispatch path
//! - Dropping the dispatch future cancels the attempt in flight and
//!   starts no further attempts
//! - Retries are invisible to the caller apart from latency

pub mod error;
pub mod request;
pub mod response;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::config::validation::validate_pool_setup;
use crate::config::{ConfigError, HostConfig, HostOptions, PoolConfig};
use crate::health::probe::{HealthProber, PingStats};
use crate::load_balancer::host::{Host, HostStatus};
use crate::load_balancer::{FailoverPolicy, HostRegistry, RoundRobin};
use crate::observability::metrics;
use crate::resilience::backoff::BackoffPolicy;
use crate::resilience::retries::{RetryPlan, Step};
use crate::transport::{HttpTransport, Transport, TransportError};

pub use error::{PoolError, PoolResult};
pub use request::{LogicalRequest, Method};
pub use response::{Outcome, Response};

#[derive(Debug, Clone)]
struct PoolSettings {
    max_attempts: Option<usize>,
    request_timeout: Duration,
    probe_path: String,
}

/// A set of database hosts behind one logical endpoint.
///
/// Cloning is cheap; clones share hosts, health state and the rotation cursor.
pub struct Pool<T: Transport = HttpTransport> {
    registry: Arc<HostRegistry>,
    policy: Arc<dyn FailoverPolicy>,
    transport: Arc<T>,
    settings: Arc<PoolSettings>,
}

impl<T: Transport> Clone for Pool<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            policy: self.policy.clone(),
            transport: self.transport.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("hosts", &self.registry.len())
            .field("policy", &self.policy)
            .field("max_attempts", &self.settings.max_attempts)
            .field("request_timeout", &self.settings.request_timeout)
            .finish()
    }
}

impl Pool<HttpTransport> {
    /// Create a pool sending requests over HTTP.
    pub fn new(hosts: &[HostConfig], config: &PoolConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new()?;
        Self::with_transport(hosts, config, transport)
    }
}

impl<T: Transport> Pool<T> {
    /// Create a pool over a custom transport. Validation happens here,
    /// not at request time.
    pub fn with_transport(
        hosts: &[HostConfig],
        config: &PoolConfig,
        transport: T,
    ) -> Result<Self, ConfigError> {
        validate_pool_setup(hosts, config).map_err(ConfigError::Validation)?;

        let registry = HostRegistry::new(
            BackoffPolicy::from(&config.backoff),
            config.failure_threshold,
        );
        for host in hosts {
            let url = host.base_url().map_err(|e| ConfigError::InvalidHost {
                address: format!("{}://{}:{}", host.protocol, host.host, host.port),
                reason: e.to_string(),
            })?;
            registry.add_host(url, host.options.clone());
        }

        tracing::debug!(
            hosts = registry.len(),
            max_attempts = ?config.max_attempts,
            failure_threshold = config.failure_threshold,
            "Pool initialized"
        );

        Ok(Self {
            registry: Arc::new(registry),
            policy: Arc::new(RoundRobin::new()),
            transport: Arc::new(transport),
            settings: Arc::new(PoolSettings {
                max_attempts: config.max_attempts,
                request_timeout: config.request_timeout(),
                probe_path: config.probe_path.clone(),
            }),
        })
    }

    /// Append a host in the available state.
    pub fn add_host(&self, url: Url, options: HostOptions) {
        self.registry.add_host(url, options);
    }

    /// Remove every host with this address. Returns how many were removed.
    pub fn remove_host(&self, url: &Url) -> usize {
        self.registry.remove_host(url)
    }

    /// Health snapshot of every host in configuration order.
    pub fn hosts(&self) -> Vec<HostStatus> {
        self.registry.statuses(Instant::now())
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request to the first host that accepts it.
    pub async fn dispatch(&self, request: &LogicalRequest) -> PoolResult<Response> {
        let span = tracing::debug_span!(
            "dispatch",
            id = %Uuid::new_v4(),
            method = %request.method(),
            path = request.path(),
        );
        let result = self.run(request).instrument(span).await;
        metrics::record_dispatch(match &result {
            Ok(_) => "success",
            Err(PoolError::Application { .. }) => "application_error",
            Err(PoolError::Exhausted { .. }) => "exhausted",
            Err(PoolError::Decode { .. }) => "decode_error",
        });
        result
    }

    /// Dispatch and decode the successful body as JSON.
    pub async fn json<R: DeserializeOwned>(&self, request: &LogicalRequest) -> PoolResult<R> {
        let response = self.dispatch(request).await?;
        serde_json::from_str(&response.body).map_err(|source| PoolError::Decode {
            host: response.host,
            source,
        })
    }

    /// Dispatch for the side effect only; any body is dropped.
    pub async fn discard(&self, request: &LogicalRequest) -> PoolResult<()> {
        self.dispatch(request).await.map(|_| ())
    }

    /// Prober sharing this pool's hosts and transport.
    pub fn prober(&self) -> HealthProber<T> {
        HealthProber::new(
            self.registry.clone(),
            self.transport.clone(),
            self.settings.probe_path.clone(),
        )
    }

    /// Ping every host concurrently. Does not affect failover state.
    pub async fn ping(&self, timeout: Duration) -> Vec<PingStats> {
        self.prober().probe_all(timeout).await
    }

    async fn run(&self, request: &LogicalRequest) -> PoolResult<Response> {
        let hosts = self.registry.snapshot();
        let candidates = self.policy.select_order(&hosts, Instant::now());
        let max_attempts = self.settings.max_attempts.unwrap_or(hosts.len());
        let mut plan = RetryPlan::new(candidates, max_attempts);

        loop {
            let (host, attempt) = match plan.next_step() {
                Step::Attempt { candidate, attempt } => (candidate, attempt),
                Step::Exhausted {
                    attempts,
                    last_error,
                } => {
                    tracing::warn!(
                        attempts,
                        last_error = ?last_error,
                        "Pool exhausted"
                    );
                    return Err(PoolError::Exhausted {
                        attempts,
                        last_error,
                    });
                }
            };

            tracing::debug!(host = %host.url(), attempt, "Dispatching attempt");
            let outcome = self.attempt(&host, request).await;
            metrics::record_attempt(host.url().as_str(), outcome.label());

            match outcome {
                Outcome::Success(raw) => {
                    self.registry.mark_success(&host);
                    return Ok(Response::from_raw(host.url(), raw));
                }
                Outcome::ApplicationFailure { status, body } => {
                    tracing::debug!(host = %host.url(), status, "Request rejected by host");
                    return Err(PoolError::Application {
                        host: host.url().clone(),
                        status,
                        body,
                    });
                }
                Outcome::TransportFailure(error) => {
                    tracing::warn!(
                        host = %host.url(),
                        attempt,
                        error = %error,
                        "Transport failure, trying next host"
                    );
                    self.registry.mark_failure(&host, Instant::now());
                    plan.record_failure(error);
                }
            }
        }
    }

    async fn attempt(&self, host: &Host, request: &LogicalRequest) -> Outcome {
        let timeout = request
            .timeout_override()
            .or_else(|| host.options().timeout())
            .unwrap_or(self.settings.request_timeout);

        let started = Instant::now();
        let result = match tokio::time::timeout(timeout, self.transport.send(host, request, timeout)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout)),
        };
        metrics::record_attempt_duration(host.url().as_str(), started.elapsed());

        Outcome::classify(result)
    }
}
