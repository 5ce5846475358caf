//! Virtual-clock environment.

use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use latchkey_core::Environment;

/// Environment whose clock only moves when told to.
///
/// Clones share the clock. `sleep` advances it and completes immediately.
#[derive(Debug, Clone)]
pub struct SimEnv {
    now: Arc<Mutex<Instant>>,
}

impl SimEnv {
    /// Clock starting at the current wall-clock instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Clock starting at `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Move the clock forward.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += duration;
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        std::future::ready(())
    }
}

#[cfg(test)]
mod tests {
    use std::task::{Context, Waker};

    use super::*;

    #[test]
    fn clones_share_the_clock() {
        let env = SimEnv::new();
        let other = env.clone();
        let t0 = env.now();

        other.advance(Duration::from_millis(250));
        assert_eq!(env.now(), t0 + Duration::from_millis(250));
    }

    #[test]
    fn sleep_advances_and_completes_immediately() {
        let env = SimEnv::new();
        let t0 = env.now();

        let mut sleep = std::pin::pin!(env.sleep(Duration::from_secs(1)));
        let mut cx = Context::from_waker(Waker::noop());
        assert!(sleep.as_mut().poll(&mut cx).is_ready());
        assert_eq!(env.now(), t0 + Duration::from_secs(1));
    }
}
