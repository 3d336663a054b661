//! Retry plan for one dispatch.
//!
//! # Responsibilities
//! - Walk the candidate list in order, one attempt per candidate
//! - Stop after `max_attempts` or when candidates run out
//! - Remember the last transport failure for the exhausted error
//!
//! # Design Decisions
//! - Explicit state (candidate index, attempts remaining) so tests can
//!   drive it without a network
//! - No sleeping between attempts: each retry goes to a different host,
//!   and the failed host's cool-down is tracked by the registry instead

use crate::transport::TransportError;

/// What the dispatcher should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<H> {
    /// Try this candidate; `attempt` counts from 1.
    Attempt { candidate: H, attempt: usize },
    /// Nothing left to try.
    Exhausted {
        attempts: usize,
        last_error: Option<TransportError>,
    },
}

/// State machine over "candidate index" and "attempts remaining".
#[derive(Debug)]
pub struct RetryPlan<H> {
    candidates: Vec<H>,
    next_index: usize,
    attempts_remaining: usize,
    last_error: Option<TransportError>,
}

impl<H: Clone> RetryPlan<H> {
    pub fn new(candidates: Vec<H>, max_attempts: usize) -> Self {
        let attempts_remaining = max_attempts.min(candidates.len());
        Self {
            candidates,
            next_index: 0,
            attempts_remaining,
            last_error: None,
        }
    }

    pub fn next_step(&mut self) -> Step<H> {
        if self.attempts_remaining == 0 {
            return Step::Exhausted {
                attempts: self.next_index,
                last_error: self.last_error.take(),
            };
        }
        let candidate = self.candidates[self.next_index].clone();
        self.next_index += 1;
        self.attempts_remaining -= 1;
        Step::Attempt {
            candidate,
            attempt: self.next_index,
        }
    }

    /// Record the transport failure of the attempt just made.
    pub fn record_failure(&mut self, error: TransportError) {
        self.last_error = Some(error);
    }

    pub fn attempts_made(&self) -> usize {
        self.next_index
    }

    pub fn attempts_remaining(&self) -> usize {
        self.attempts_remaining
    }
}
