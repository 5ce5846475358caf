//! Environment abstraction.
//!
//! The state machines never read the clock themselves; runtimes hand them
//! `now` explicitly. Runtimes get that `now`, and their loop pacing, from an
//! [`Environment`] so the same loop runs against the wall clock in production
//! and against a virtual clock in simulation.

use std::{
    future::Future,
    time::{Duration, Instant},
};

/// Source of time for a runtime.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Wait for `duration` to pass.
    ///
    /// Simulated environments may complete immediately after advancing their
    /// virtual clock.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}
