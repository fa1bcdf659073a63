//! Deadline Module
//!
//! Per-call deadline applied to every store round trip.

use std::future::Future;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use crate::error::{StoreError, StoreResult};

// == Deadline ==
/// Point in time by which an operation must finish. `Deadline::none()`
/// lets every call run to completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline.
    pub fn none() -> Self {
        Self { at: None }
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
        }
    }

    /// Deadline at a fixed instant.
    pub fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// Returns true once the deadline has passed.
    pub fn is_elapsed(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Runs one store round trip under this deadline. The round trip is
    /// not started once the deadline has passed.
    pub async fn run<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        if self.is_elapsed() {
            return Err(StoreError::DeadlineExceeded);
        }
        match self.at {
            Some(at) => timeout_at(at, fut)
                .await
                .unwrap_or(Err(StoreError::DeadlineExceeded)),
            None => fut.await,
        }
    }
}
