//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! pool / load_balancer / health produce:
//!     → logging.rs (structured tracing events, one span per dispatch)
//!     → metrics.rs (counters, gauges, histograms through the `metrics` facade)
//!
//! Consumers:
//!     → stderr via the fmt layer (CLI)
//!     → whatever recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a recorder or subscriber on its own
//! - Metric updates are no-ops until a recorder exists
//! - Dispatch ids flow through the span, not through function arguments

pub mod logging;
pub mod metrics;
