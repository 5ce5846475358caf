//! Reference model of the controller.
//!
//! A deliberately naive, tick-indexed description of what the controller
//! should do. Model-based tests run the same [`Operation`] sequence through
//! this model and the real controller and compare the observable results.

use latchkey_core::{ControllerConfig, LockState};

use crate::operation::Operation;

/// Tick-indexed reference lock.
#[derive(Debug, Clone)]
pub struct ModelLock {
    state: LockState,
    pending_deadline: Option<u64>,
    tick: u64,
    actuations: u64,
    audit_records: usize,
    debounce_ticks: u64,
    auto_lock_ticks: u64,
    button_auto_lock: bool,
}

impl ModelLock {
    /// Model for `config`. Delays are rounded down to whole poll intervals,
    /// so configs used with the model should use exact multiples.
    pub fn new(config: &ControllerConfig) -> Self {
        let tick = config.poll_interval.as_nanos().max(1);
        Self {
            state: LockState::Locked,
            pending_deadline: None,
            tick: 0,
            // boot lock
            actuations: 1,
            audit_records: 0,
            debounce_ticks: (config.debounce_delay.as_nanos() / tick) as u64,
            auto_lock_ticks: (config.auto_lock_delay.as_nanos() / tick) as u64,
            button_auto_lock: config.button_auto_lock,
        }
    }

    /// Expected lock state.
    pub fn state(&self) -> LockState {
        self.state
    }

    /// Expected actuator transitions, including the boot lock.
    pub fn actuations(&self) -> u64 {
        self.actuations
    }

    /// Expected audit record count.
    pub fn audit_records(&self) -> usize {
        self.audit_records
    }

    /// Whether an auto-lock should be pending.
    pub fn has_pending_auto_lock(&self) -> bool {
        self.pending_deadline.is_some()
    }

    /// Apply one operation.
    pub fn apply(&mut self, op: &Operation) {
        match *op {
            Operation::Press { hold_ticks } => {
                for k in 0..u64::from(hold_ticks) {
                    self.poll(k == self.debounce_ticks);
                }
                for _ in 0..self.settle_ticks() {
                    self.poll(false);
                }
            },
            Operation::Advance { ticks } => {
                for _ in 0..ticks {
                    self.poll(false);
                }
            },
            Operation::RemoteLock { password } => {
                if password.is_valid() {
                    self.lock();
                }
                self.audit_records += 1;
            },
            Operation::RemoteUnlock { password, auto_lock } => {
                if password.is_valid() {
                    self.unlock(auto_lock);
                }
                self.audit_records += 1;
            },
            Operation::QueryState => self.audit_records += 1,
        }
    }

    /// Polls needed after a release for the debouncer to accept it.
    pub fn settle_ticks(&self) -> u64 {
        self.debounce_ticks + 1
    }

    fn poll(&mut self, activation: bool) {
        if activation {
            self.unlock(self.button_auto_lock);
            self.audit_records += 1;
        }
        if self.pending_deadline.is_some_and(|deadline| deadline <= self.tick) {
            self.pending_deadline = None;
            if self.state == LockState::Unlocked {
                self.actuations += 1;
                self.state = LockState::Locked;
                self.audit_records += 1;
            }
        }
        self.tick += 1;
    }

    fn lock(&mut self) {
        if self.state == LockState::Unlocked {
            self.actuations += 1;
        }
        self.state = LockState::Locked;
        self.pending_deadline = None;
    }

    fn unlock(&mut self, auto_lock: bool) {
        if self.state == LockState::Locked {
            self.actuations += 1;
        }
        self.state = LockState::Unlocked;
        self.pending_deadline = auto_lock.then_some(self.tick + self.auto_lock_ticks);
    }
}
