//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatch of one logical request:
//!     → retries.rs (next candidate while attempts remain)
//!     → transport call bounded by its own timeout
//!     → On transport failure: backoff.rs computes the host's cool-down,
//!       registry records it, retries.rs moves to the next candidate
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every transport call has a deadline
//! - Retries go to a different host, never the same one twice per dispatch
//! - Application errors are never retried
//! - Cool-downs are per-host and grow exponentially up to a ceiling

pub mod backoff;
pub mod retries;
