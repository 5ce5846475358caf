//! Lock coordinator.
//!
//! The only owner of the [`Actuator`]. Button presses, remote requests and
//! auto-lock firings all arrive here, get authorized (remote only), drive the
//! actuator and leave exactly one audit record per intent.
//!
//! # State Machine
//!
//! ```text
//!                    unlock (auto-lock requested)
//!        ┌────────┐ ─────────────────────────────> ┌─────────────────────┐
//!        │        │                                 │ Unlocked + pending  │
//!        │ Locked │ <───────────────────────────── │                     │
//!        │        │   lock / auto-lock fires        └─────────────────────┘
//!        │        │                                          │ unlock
//!        │        │ ───────────────────────────────> ┌──────────────┐
//!        └────────┘   unlock (declined)              │   Unlocked   │
//!             ^  <─────────────────────────────────  └──────────────┘
//!             │                lock
//! ```
//!
//! # Auto-lock
//!
//! At most one auto-lock is pending at any time. Every unlock replaces it (a
//! fresh token if auto-lock was requested, none otherwise) and a manual lock
//! clears it. The scheduler has no cancellation, so older timers still fire;
//! their token no longer matches and they are dropped. A firing with the
//! current token re-reads the actuator and only locks if it is still
//! unlocked. Because the coordinator runs on the single control loop, the
//! re-read cannot interleave with another write.

use std::{
    fmt,
    net::IpAddr,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    actuator::{Actuator, LockState},
    audit::{AuditLog, AuditStore},
    auth::{AutoLock, Credential, CredentialSet},
    pins::OutputPin,
    scheduler::{AutoLockToken, DeferredAction, DueTask, Scheduler},
};

/// Audit message for a completed auto-lock.
pub const AUTO_LOCKED: &str = " \\_ AUTO LOCKED";

/// Where an intent came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The physical button. Never needs a credential.
    Local,
    /// A network request.
    Remote {
        /// Peer address
        addr: IpAddr,
        /// Credential presented with the request, if any
        credential: Option<Credential>,
    },
}

impl Origin {
    /// Remote origin.
    pub fn remote(addr: IpAddr, credential: Option<Credential>) -> Self {
        Self::Remote { addr, credential }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("LOCAL"),
            Self::Remote { addr, .. } => write!(f, "{addr}"),
        }
    }
}

/// Requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Drive to Locked.
    Lock,
    /// Drive to Unlocked.
    Unlock {
        /// Whether to re-lock after the auto-lock delay
        auto_lock: AutoLock,
    },
}

impl Intent {
    fn verb(self) -> &'static str {
        match self {
            Self::Lock => "LOCK",
            Self::Unlock { .. } => "UNLOCK",
        }
    }
}

/// Result of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The actuator is now in `state`.
    Accepted {
        /// State read back after driving
        state: LockState,
        /// When the auto-lock will fire, if one was scheduled
        auto_lock_at: Option<Instant>,
    },
    /// Credential missing or not accepted; hardware untouched.
    Rejected,
}

impl IntentOutcome {
    /// True for [`IntentOutcome::Accepted`].
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Result of an auto-lock firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoLockOutcome {
    /// Still unlocked at the deadline; now locked.
    Relocked,
    /// Someone locked manually before the deadline; nothing done.
    AlreadyLocked,
    /// A later unlock or lock replaced this request; nothing done.
    Superseded,
}

#[derive(Debug, Clone, Copy)]
struct PendingAutoLock {
    token: AutoLockToken,
    deadline: Instant,
}

/// The lock state machine.
#[derive(Debug)]
pub struct LockCoordinator<P, S> {
    actuator: Actuator<P>,
    credentials: CredentialSet,
    audit: AuditLog<S>,
    scheduler: Scheduler,
    auto_lock_delay: Duration,
    pending: Option<PendingAutoLock>,
    next_token: u64,
}

impl<P: OutputPin, S: AuditStore> LockCoordinator<P, S> {
    /// Take ownership of the actuator and drive it to Locked.
    pub fn new(
        mut actuator: Actuator<P>,
        credentials: CredentialSet,
        audit: AuditLog<S>,
        auto_lock_delay: Duration,
    ) -> Self {
        actuator.lock();
        Self {
            actuator,
            credentials,
            audit,
            scheduler: Scheduler::new(),
            auto_lock_delay,
            pending: None,
            next_token: 0,
        }
    }

    /// Resolve one intent. Never fails; every call leaves one audit record.
    pub fn handle(&mut self, origin: &Origin, intent: Intent, now: Instant) -> IntentOutcome {
        if !self.is_authorized(origin) {
            warn!(%origin, intent = intent.verb(), "unauthorized intent rejected");
            self.audit.record(now, format!("{} FAIL: {origin}", intent.verb()));
            return IntentOutcome::Rejected;
        }

        let auto_lock_at = match intent {
            Intent::Lock => {
                self.pending = None;
                let written = self.actuator.lock();
                debug!(%origin, written, "lock");
                None
            },
            Intent::Unlock { auto_lock } => {
                let written = self.actuator.unlock();
                debug!(%origin, written, "unlock");
                self.replace_pending(auto_lock, now)
            },
        };

        self.audit.record(now, format!("{} SUCCESS: {origin}", intent.verb()));
        let state = self.actuator.state();
        info!(%origin, %state, ?auto_lock_at, "intent applied");
        IntentOutcome::Accepted { state, auto_lock_at }
    }

    /// Report the current state, auditing the query.
    pub fn query_state(&mut self, origin: &Origin, now: Instant) -> LockState {
        self.audit.record(now, format!("STATE REQUEST: {origin}"));
        self.actuator.state()
    }

    /// Fire every due deferred action.
    pub fn poll_timers(&mut self, now: Instant) -> Vec<AutoLockOutcome> {
        self.scheduler.poll(now).into_iter().map(|task| self.fire(task, now)).collect()
    }

    /// Current state without auditing.
    pub fn state(&self) -> LockState {
        self.actuator.state()
    }

    /// Deadline of the live auto-lock, if any.
    pub fn pending_auto_lock(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    /// Transitions performed by the actuator since startup (including the
    /// initial lock).
    pub fn actuations(&self) -> u64 {
        self.actuator.actuations()
    }

    /// The audit log.
    pub fn audit_log(&self) -> &AuditLog<S> {
        &self.audit
    }

    /// The deferred-action queue.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    fn is_authorized(&self, origin: &Origin) -> bool {
        match origin {
            Origin::Local => true,
            Origin::Remote { credential, .. } => self.credentials.authorize(credential.as_ref()),
        }
    }

    fn replace_pending(&mut self, auto_lock: AutoLock, now: Instant) -> Option<Instant> {
        if let Some(stale) = self.pending.take() {
            debug!(token = stale.token.0, "pending auto-lock superseded");
        }
        if !auto_lock.is_requested() {
            return None;
        }

        let token = AutoLockToken(self.next_token);
        self.next_token += 1;
        self.scheduler.schedule(now, self.auto_lock_delay, DeferredAction::AutoLock { token });
        let deadline = now + self.auto_lock_delay;
        self.pending = Some(PendingAutoLock { token, deadline });
        Some(deadline)
    }

    fn fire(&mut self, task: DueTask, now: Instant) -> AutoLockOutcome {
        let DeferredAction::AutoLock { token } = task.action;
        let is_current = self.pending.is_some_and(|p| p.token == token);
        if !is_current {
            debug!(token = token.0, "stale auto-lock ignored");
            return AutoLockOutcome::Superseded;
        }
        self.pending = None;

        match self.actuator.state() {
            LockState::Unlocked => {
                self.actuator.lock();
                self.audit.record(now, AUTO_LOCKED);
                info!(token = token.0, "auto-locked");
                AutoLockOutcome::Relocked
            },
            LockState::Locked => {
                debug!(token = token.0, "auto-lock found actuator already locked");
                AutoLockOutcome::AlreadyLocked
            },
        }
    }
}
