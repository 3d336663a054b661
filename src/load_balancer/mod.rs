//! Host selection subsystem.
//!
//! # Data Flow
//! ```text
//! Pool::dispatch
//!     → registry.rs (snapshot of the ordered host list)
//!     → FailoverPolicy::select_order (round_robin.rs):
//!         - rotate start by the shared cursor
//!         - keep hosts whose cool-down has elapsed
//!         - none left? return every host (degraded mode)
//!     → candidates tried in order by the pool
//!     → outcome reported back to registry.rs (mark_failure / mark_success)
//! ```
//!
//! # Design Decisions
//! - Selection and bookkeeping are synchronous; only transport calls suspend
//! - Health state is per-host, not per-pool
//! - The cursor advances once per dispatch, regardless of outcome

pub mod host;
pub mod registry;
pub mod round_robin;

use std::fmt::Debug;
use std::sync::Arc;

use tokio::time::Instant;

use crate::load_balancer::host::Host;

pub use host::{HealthState, HostStatus};
pub use registry::HostRegistry;
pub use round_robin::RoundRobin;

/// Orders the hosts one dispatch will try.
pub trait FailoverPolicy: Send + Sync + Debug {
    fn select_order(&self, hosts: &[Arc<Host>], now: Instant) -> Vec<Arc<Host>>;
}
