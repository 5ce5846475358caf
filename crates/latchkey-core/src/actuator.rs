//! Dual-line actuator driver.
//!
//! The actuator is wired to two complementary output lines, both active-low:
//! the lock line engages the locking direction, the reverse line engages the
//! unlocking direction. Driving both low at once would short a dual-coil or
//! H-bridge actuator, so every transition releases the outgoing direction
//! before engaging the incoming one:
//!
//! ```text
//!            lock line   reverse line
//! Locked        Low          High
//! (transit)     High         High
//! Unlocked      High         Low
//! ```
//!
//! The lock state is never shadowed in a variable. It is read back from the
//! lock line on every query so it cannot drift away from the hardware.

use std::fmt;

use crate::pins::{Level, OutputPin};

/// Logical state of the lock, derived from the lock line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    /// Lock line engaged.
    Locked,
    /// Lock line released.
    Unlocked,
}

impl LockState {
    /// Lowercase name as used on the wire (`locked` / `unlocked`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
        }
    }
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ENGAGED: Level = Level::Low;
const RELEASED: Level = Level::High;

/// Drives the two actuator lines.
#[derive(Debug)]
pub struct Actuator<P> {
    lock_line: P,
    reverse_line: P,
    actuations: u64,
}

impl<P: OutputPin> Actuator<P> {
    /// Wrap the two output lines. No line is written.
    pub fn new(lock_line: P, reverse_line: P) -> Self {
        Self { lock_line, reverse_line, actuations: 0 }
    }

    /// Drive to the locked configuration.
    ///
    /// Returns `false` without writing if the lines already read back as
    /// locked.
    pub fn lock(&mut self) -> bool {
        if self.is_configured(LockState::Locked) {
            return false;
        }
        self.reverse_line.set_level(RELEASED);
        self.lock_line.set_level(ENGAGED);
        self.actuations += 1;
        true
    }

    /// Drive to the unlocked configuration.
    ///
    /// Returns `false` without writing if the lines already read back as
    /// unlocked.
    pub fn unlock(&mut self) -> bool {
        if self.is_configured(LockState::Unlocked) {
            return false;
        }
        self.lock_line.set_level(RELEASED);
        self.reverse_line.set_level(ENGAGED);
        self.actuations += 1;
        true
    }

    /// Current state, read back from the lock line.
    pub fn state(&self) -> LockState {
        if self.lock_line.level() == ENGAGED { LockState::Locked } else { LockState::Unlocked }
    }

    /// Number of transitions this driver has performed.
    pub fn actuations(&self) -> u64 {
        self.actuations
    }

    /// Both lines read back exactly the configuration for `state`.
    ///
    /// Anything else (both released after power-up, or both engaged) is
    /// treated as "not there yet" so the next drive rewrites both lines.
    fn is_configured(&self, state: LockState) -> bool {
        let (lock, reverse) = (self.lock_line.level(), self.reverse_line.level());
        match state {
            LockState::Locked => lock == ENGAGED && reverse == RELEASED,
            LockState::Unlocked => lock == RELEASED && reverse == ENGAGED,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Line that appends every write to a shared trace.
    struct TraceLine {
        name: &'static str,
        level: Level,
        trace: Arc<Mutex<Vec<(&'static str, Level)>>>,
    }

    impl OutputPin for TraceLine {
        fn set_level(&mut self, level: Level) {
            self.level = level;
            self.trace.lock().unwrap().push((self.name, level));
        }

        fn level(&self) -> Level {
            self.level
        }
    }

    fn actuator() -> (Actuator<TraceLine>, Arc<Mutex<Vec<(&'static str, Level)>>>) {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let lock = TraceLine { name: "lock", level: Level::High, trace: Arc::clone(&trace) };
        let reverse = TraceLine { name: "reverse", level: Level::High, trace: Arc::clone(&trace) };
        (Actuator::new(lock, reverse), trace)
    }

    #[test]
    fn lock_releases_reverse_before_engaging() {
        let (mut actuator, trace) = actuator();
        assert!(actuator.lock());
        assert_eq!(*trace.lock().unwrap(), vec![("reverse", Level::High), ("lock", Level::Low)]);
        assert_eq!(actuator.state(), LockState::Locked);
    }

    #[test]
    fn unlock_releases_lock_before_engaging() {
        let (mut actuator, trace) = actuator();
        actuator.lock();
        trace.lock().unwrap().clear();

        assert!(actuator.unlock());
        assert_eq!(*trace.lock().unwrap(), vec![("lock", Level::High), ("reverse", Level::Low)]);
        assert_eq!(actuator.state(), LockState::Unlocked);
    }

    #[test]
    fn lines_never_engaged_together() {
        let (mut actuator, trace) = actuator();
        actuator.lock();
        actuator.unlock();
        actuator.lock();

        let mut lock = Level::High;
        let mut reverse = Level::High;
        for (name, level) in trace.lock().unwrap().iter() {
            match *name {
                "lock" => lock = *level,
                _ => reverse = *level,
            }
            assert!(!(lock.is_low() && reverse.is_low()), "both lines engaged");
        }
    }

    #[test]
    fn repeated_lock_writes_nothing() {
        let (mut actuator, trace) = actuator();
        actuator.lock();
        let writes = trace.lock().unwrap().len();

        assert!(!actuator.lock());
        assert_eq!(trace.lock().unwrap().len(), writes);
        assert_eq!(actuator.actuations(), 1);
    }

    #[test]
    fn power_up_state_reads_unlocked_until_driven() {
        let (actuator, _) = actuator();
        assert_eq!(actuator.state(), LockState::Unlocked);
    }
}
