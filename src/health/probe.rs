//! Concurrent host probing.
//!
//! # Responsibilities
//! - Ping every host with its own timeout
//! - Report reachability, round trip and server version

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::time::{self, Instant};
use url::Url;

use crate::load_balancer::host::Host;
use crate::load_balancer::HostRegistry;
use crate::observability::metrics;
use crate::pool::request::LogicalRequest;
use crate::transport::Transport;

/// Header carrying the server build version.
pub const VERSION_HEADER: &str = "X-Influxdb-Version";

/// Result of pinging one host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingStats {
    pub url: Url,
    pub online: bool,
    #[serde(with = "rtt_millis")]
    pub rtt: Option<Duration>,
    pub version: Option<String>,
}

mod rtt_millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(rtt: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match rtt {
            Some(rtt) => s.serialize_some(&(rtt.as_secs_f64() * 1000.0)),
            None => s.serialize_none(),
        }
    }
}

pub struct HealthProber<T: Transport> {
    registry: Arc<HostRegistry>,
    transport: Arc<T>,
    path: String,
}

impl<T: Transport> HealthProber<T> {
    pub fn new(registry: Arc<HostRegistry>, transport: Arc<T>, path: impl Into<String>) -> Self {
        Self {
            registry,
            transport,
            path: path.into(),
        }
    }

    /// Probe every host concurrently. Results keep configuration order.
    pub async fn probe_all(&self, timeout: Duration) -> Vec<PingStats> {
        let hosts = self.registry.snapshot();
        let request = LogicalRequest::get(self.path.as_str());

        let probes = hosts
            .iter()
            .map(|host| self.probe(host, &request, timeout));
        join_all(probes).await
    }

    async fn probe(&self, host: &Host, request: &LogicalRequest, timeout: Duration) -> PingStats {
        let started = Instant::now();
        let result = time::timeout(timeout, self.transport.send(host, request, timeout)).await;
        let rtt = started.elapsed();

        let stats = match result {
            Ok(Ok(response)) if response.status < 300 => PingStats {
                url: host.url().clone(),
                online: true,
                rtt: Some(rtt),
                version: response.header(VERSION_HEADER).map(str::to_string),
            },
            Ok(Ok(response)) => {
                tracing::warn!(host = %host.url(), status = response.status, "Ping failed: non-success status");
                offline(host)
            }
            Ok(Err(e)) => {
                tracing::warn!(host = %host.url(), error = %e, "Ping failed");
                offline(host)
            }
            Err(_) => {
                tracing::warn!(host = %host.url(), ?timeout, "Ping failed: timeout");
                offline(host)
            }
        };

        metrics::record_probe(host.url().as_str(), stats.online, stats.rtt);
        stats
    }
}

fn offline(host: &Host) -> PingStats {
    PingStats {
        url: host.url().clone(),
        online: false,
        rtt: None,
        version: None,
    }
}
