//! Cooperative deferred-action queue.
//!
//! A one-shot timer list polled from the control loop. Tasks carry plain
//! data ([`DeferredAction`]) rather than closures, so whoever handles a due
//! task has to look at the current state explicitly before acting on it.
//!
//! Due tasks come out ordered by deadline; tasks with the same deadline come
//! out in the order they were scheduled.

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};

/// Identifies one auto-lock request.
///
/// The coordinator compares a firing token against the one it currently
/// expects; a mismatch means the request was superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AutoLockToken(pub u64);

/// Work to perform when a task comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Re-lock the actuator if it is still unlocked.
    AutoLock {
        /// Which unlock requested this re-lock
        token: AutoLockToken,
    },
}

/// Handle returned by [`Scheduler::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// A task whose deadline has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTask {
    /// Handle from scheduling
    pub handle: TaskHandle,
    /// Deadline the task was scheduled for
    pub deadline: Instant,
    /// What to do
    pub action: DeferredAction,
}

/// One-shot timer queue.
#[derive(Debug, Default)]
pub struct Scheduler {
    /// Keyed by (deadline, schedule sequence) for deterministic ordering
    queue: BTreeMap<(Instant, u64), DeferredAction>,
    next_seq: u64,
}

impl Scheduler {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `action` to fire at `now + delay`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: DeferredAction) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.insert((now + delay, seq), action);
        TaskHandle(seq)
    }

    /// Remove and return every task with a deadline at or before `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<DueTask> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            let (deadline, seq) = *entry.key();
            if deadline > now {
                break;
            }
            let action = entry.remove();
            due.push(DueTask { handle: TaskHandle(seq), deadline, action });
        }
        due
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto_lock(n: u64) -> DeferredAction {
        DeferredAction::AutoLock { token: AutoLockToken(n) }
    }

    #[test]
    fn fires_only_after_deadline() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(t0, Duration::from_secs(5), auto_lock(1));

        assert!(scheduler.poll(t0 + Duration::from_millis(4999)).is_empty());
        let due = scheduler.poll(t0 + Duration::from_secs(5));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].action, auto_lock(1));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn one_shot() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(t0, Duration::ZERO, auto_lock(1));

        assert_eq!(scheduler.poll(t0).len(), 1);
        assert!(scheduler.poll(t0 + Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn ordered_by_deadline_then_schedule_order() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(t0, Duration::from_secs(3), auto_lock(1));
        scheduler.schedule(t0, Duration::from_secs(1), auto_lock(2));
        scheduler.schedule(t0 + Duration::from_secs(1), Duration::from_secs(2), auto_lock(3));
        scheduler.schedule(t0, Duration::from_secs(1), auto_lock(4));

        let order: Vec<_> = scheduler.poll(t0 + Duration::from_secs(10)).iter().map(|t| t.action).collect();
        assert_eq!(order, vec![auto_lock(2), auto_lock(4), auto_lock(1), auto_lock(3)]);
    }

    #[test]
    fn next_deadline_tracks_earliest() {
        let t0 = Instant::now();
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.next_deadline(), None);

        scheduler.schedule(t0, Duration::from_secs(5), auto_lock(1));
        scheduler.schedule(t0, Duration::from_secs(2), auto_lock(2));
        assert_eq!(scheduler.next_deadline(), Some(t0 + Duration::from_secs(2)));
        assert_eq!(scheduler.len(), 2);
    }
}
