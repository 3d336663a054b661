//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the CLI
//! - Honor `RUST_LOG` first, then the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Library code only emits events; installing a subscriber is the
//!   binary's job

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!("influx_pool={}", config.log_level)
}

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
