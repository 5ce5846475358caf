//! Application context.
//!
//! One [`Controller`] is built at startup and owned by the control loop. It
//! bundles the coordinator with the button so runtimes can run the
//! cooperative cycle without any global state:
//!
//! 1. [`Controller::poll_input`] samples the button
//! 2. [`Controller::handle`] resolves each queued network intent
//! 3. [`Controller::poll_timers`] fires due auto-locks
//!
//! Each step runs to completion before the next one starts.

use std::time::Instant;

use tracing::info;

use crate::{
    actuator::{Actuator, LockState},
    audit::{AuditLog, AuditStore},
    auth::{AutoLock, CredentialSet},
    config::ControllerConfig,
    coordinator::{AutoLockOutcome, Intent, IntentOutcome, LockCoordinator, Origin},
    debounce::{Button, InputEvent},
    error::ConfigError,
    pins::{ActiveLevel, InputPin, OutputPin},
};

/// Controller context: coordinator plus button.
#[derive(Debug)]
pub struct Controller<Out, In, S> {
    coordinator: LockCoordinator<Out, S>,
    button: Button<In>,
    config: ControllerConfig,
}

impl<Out, In, S> Controller<Out, In, S>
where
    Out: OutputPin,
    In: InputPin,
    S: AuditStore,
{
    /// Assemble the controller. Drives the actuator to Locked.
    ///
    /// The button is wired pulled-up and active-low.
    pub fn new(
        config: ControllerConfig,
        actuator: Actuator<Out>,
        button_pin: In,
        credentials: CredentialSet,
        audit: AuditLog<S>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let button = Button::new(button_pin, ActiveLevel::Low, config.debounce_delay);
        let coordinator =
            LockCoordinator::new(actuator, credentials, audit, config.auto_lock_delay);
        Ok(Self { coordinator, button, config })
    }

    /// Step (a): sample the button and unlock on activation.
    pub fn poll_input(&mut self, now: Instant) -> Option<IntentOutcome> {
        let InputEvent::Activated = self.button.poll(now)?;
        info!("button activated");
        let auto_lock = AutoLock::from(self.config.button_auto_lock);
        Some(self.coordinator.handle(&Origin::Local, Intent::Unlock { auto_lock }, now))
    }

    /// Step (b): resolve one intent.
    pub fn handle(&mut self, origin: &Origin, intent: Intent, now: Instant) -> IntentOutcome {
        self.coordinator.handle(origin, intent, now)
    }

    /// Step (c): fire due auto-locks.
    pub fn poll_timers(&mut self, now: Instant) -> Vec<AutoLockOutcome> {
        self.coordinator.poll_timers(now)
    }

    /// Audited state query.
    pub fn query_state(&mut self, origin: &Origin, now: Instant) -> LockState {
        self.coordinator.query_state(origin, now)
    }

    /// The audit log.
    pub fn audit_log(&self) -> &AuditLog<S> {
        self.coordinator.audit_log()
    }

    /// Full audit log content.
    pub fn audit_content(&self) -> String {
        self.audit_log().retrieve()
    }

    /// The coordinator, read-only.
    pub fn coordinator(&self) -> &LockCoordinator<Out, S> {
        &self.coordinator
    }

    /// The button, read-only.
    pub fn button(&self) -> &Button<In> {
        &self.button
    }

    /// Configuration in effect.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}
