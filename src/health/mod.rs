//! Health probing.
//!
//! # Data Flow
//! ```text
//! Pool::ping / CLI `ping`
//!     → probe.rs sends GET <probe path> to every host at once
//!     → one PingStats per host, in configuration order
//! ```
//!
//! # Design Decisions
//! - Probes are observational: they never mark hosts or move the cursor
//! - Passive health (failures seen during dispatch) lives in load_balancer

pub mod probe;

pub use probe::{HealthProber, PingStats};
