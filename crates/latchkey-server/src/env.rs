//! Tokio-backed environment.

use std::{future::Future, time::Duration};

use latchkey_core::Environment;

/// Production [`Environment`] on the tokio clock.
///
/// Reads `tokio::time::Instant` so a paused test runtime drives the
/// controller's clock too.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioEnv;

impl Environment for TokioEnv {
    fn now(&self) -> std::time::Instant {
        tokio::time::Instant::now().into_std()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
