//! World state for scenario execution.
//!
//! The World owns a real controller wired to simulated lines and a virtual
//! clock, runs the same cooperative cycle as the production loop, and keeps
//! every outcome for oracle verification.

use std::{
    net::{IpAddr, Ipv4Addr},
    time::{Duration, Instant},
};

use latchkey_core::{
    Actuator, AuditLog, AutoLock, AutoLockOutcome, Controller, ControllerConfig, Credential,
    CredentialSet, Environment, Intent, IntentOutcome, Level, LockState, MemoryAuditStore, Origin,
};
use tracing::trace;

use crate::{
    SimController,
    operation::{ACCEPTED_PASSWORDS, Operation},
    sim_env::SimEnv,
    sim_pins::{SimInputPin, SimOutputPin},
};

/// Address simulated remote requests come from.
pub const PEER: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));

/// Controller plus every handle a test needs to observe it.
pub struct World {
    env: SimEnv,
    controller: SimController,
    lock_line: SimOutputPin,
    reverse_line: SimOutputPin,
    button: SimInputPin,
    audit: MemoryAuditStore,
    started: Instant,
    button_outcomes: Vec<IntentOutcome>,
    remote_outcomes: Vec<IntentOutcome>,
    auto_lock_outcomes: Vec<AutoLockOutcome>,
}

impl World {
    /// Build a world accepting [`ACCEPTED_PASSWORDS`].
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: ControllerConfig) -> Result<Self, String> {
        let credentials = CredentialSet::new(ACCEPTED_PASSWORDS).map_err(|e| e.to_string())?;
        Self::with_credentials(config, credentials)
    }

    /// Build a world with a specific credential set.
    pub fn with_credentials(
        config: ControllerConfig,
        credentials: CredentialSet,
    ) -> Result<Self, String> {
        let env = SimEnv::new();
        let started = env.now();
        let lock_line = SimOutputPin::new(Level::High);
        let reverse_line = SimOutputPin::new(Level::High);
        let button = SimInputPin::new();
        let audit = MemoryAuditStore::new();

        let controller = Controller::new(
            config,
            Actuator::new(lock_line.clone(), reverse_line.clone()),
            button.clone(),
            credentials,
            AuditLog::with_store(audit.clone(), started),
        )
        .map_err(|e| e.to_string())?;

        Ok(Self {
            env,
            controller,
            lock_line,
            reverse_line,
            button,
            audit,
            started,
            button_outcomes: Vec::new(),
            remote_outcomes: Vec::new(),
            auto_lock_outcomes: Vec::new(),
        })
    }

    /// One loop cycle at the current instant, then advance one poll interval.
    pub fn tick(&mut self) {
        let now = self.env.now();
        if let Some(outcome) = self.controller.poll_input(now) {
            self.button_outcomes.push(outcome);
        }
        let fired = self.controller.poll_timers(now);
        if !fired.is_empty() {
            trace!(?fired, "timers fired");
        }
        self.auto_lock_outcomes.extend(fired);
        self.env.advance(self.poll_interval());
    }

    /// Run `n` loop cycles.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Run loop cycles until `duration` of virtual time has passed.
    pub fn run_for(&mut self, duration: Duration) {
        let end = self.env.now() + duration;
        while self.env.now() < end {
            self.tick();
        }
    }

    /// Press the button for `hold`, release it and wait for the release to
    /// settle.
    pub fn press_for(&mut self, hold: Duration) {
        self.button.press();
        self.run_for(hold);
        self.button.release();
        self.run_for(self.controller.config().debounce_delay + self.poll_interval());
    }

    /// Remote intent from [`PEER`] at the current instant.
    pub fn remote(&mut self, password: Option<&str>, intent: Intent) -> IntentOutcome {
        let origin = Origin::remote(PEER, password.map(Credential::from));
        let outcome = self.controller.handle(&origin, intent, self.env.now());
        self.remote_outcomes.push(outcome);
        outcome
    }

    /// Remote state query from [`PEER`].
    pub fn query(&mut self) -> LockState {
        self.controller.query_state(&Origin::remote(PEER, None), self.env.now())
    }

    /// Drive the actuator lines directly, bypassing the controller.
    pub fn force_lines(&mut self, state: LockState) {
        let (lock, reverse) = match state {
            LockState::Locked => (Level::Low, Level::High),
            LockState::Unlocked => (Level::High, Level::Low),
        };
        self.lock_line.force(lock);
        self.reverse_line.force(reverse);
    }

    /// Apply a tick-based [`Operation`].
    pub fn apply(&mut self, op: &Operation) {
        match *op {
            Operation::Press { hold_ticks } => {
                self.button.press();
                self.run_ticks(u64::from(hold_ticks));
                self.button.release();
                let debounce = self.controller.config().debounce_delay.as_nanos();
                let tick = self.poll_interval().as_nanos().max(1);
                self.run_ticks((debounce / tick) as u64 + 1);
            },
            Operation::RemoteLock { password } => {
                let credential = password.credential();
                self.remote(credential.as_ref().map(Credential::expose), Intent::Lock);
            },
            Operation::RemoteUnlock { password, auto_lock } => {
                let credential = password.credential();
                let intent = Intent::Unlock { auto_lock: AutoLock::from(auto_lock) };
                self.remote(credential.as_ref().map(Credential::expose), intent);
            },
            Operation::QueryState => {
                self.query();
            },
            Operation::Advance { ticks } => self.run_ticks(u64::from(ticks)),
        }
    }

    /// Current state (not audited).
    pub fn state(&self) -> LockState {
        self.controller.coordinator().state()
    }

    /// Actuator transitions including the boot lock.
    pub fn actuations(&self) -> u64 {
        self.controller.coordinator().actuations()
    }

    /// Total writes to both actuator lines.
    pub fn line_writes(&self) -> u64 {
        self.lock_line.writes() + self.reverse_line.writes()
    }

    /// Deadline of the live auto-lock.
    pub fn pending_auto_lock(&self) -> Option<Instant> {
        self.controller.coordinator().pending_auto_lock()
    }

    /// Audit messages without timestamps.
    pub fn audit_messages(&self) -> Vec<String> {
        self.audit.messages()
    }

    /// Full stored audit lines.
    pub fn audit_lines(&self) -> Vec<String> {
        self.audit.lines()
    }

    /// Outcomes of button activations.
    pub fn button_outcomes(&self) -> &[IntentOutcome] {
        &self.button_outcomes
    }

    /// Outcomes of remote intents.
    pub fn remote_outcomes(&self) -> &[IntentOutcome] {
        &self.remote_outcomes
    }

    /// Outcomes of auto-lock firings.
    pub fn auto_lock_outcomes(&self) -> &[AutoLockOutcome] {
        &self.auto_lock_outcomes
    }

    /// Virtual time elapsed since the world was built.
    pub fn elapsed(&self) -> Duration {
        self.env.now().duration_since(self.started)
    }

    /// The controller under test.
    pub fn controller(&self) -> &Controller<SimOutputPin, SimInputPin, MemoryAuditStore> {
        &self.controller
    }

    /// The controller's configuration.
    pub fn config(&self) -> &ControllerConfig {
        self.controller.config()
    }

    fn poll_interval(&self) -> Duration {
        self.controller.config().poll_interval
    }
}
