//! Scenario builder API.
//!
//! Provides a declarative API for constructing scenario tests that enforce
//! the Oracle Pattern.

use std::time::Duration;

use latchkey_core::{AutoLock, ControllerConfig, CredentialSet, Intent, LockState};

use crate::scenario::{OracleFn, World};

/// One stimulus applied to the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Hold the button, release it and let the release settle.
    Press {
        /// How long the button is held
        hold: Duration,
    },
    /// Run the loop with no stimulus.
    Advance(Duration),
    /// Remote request from the simulated peer.
    Remote {
        /// Presented `pass` header
        password: Option<String>,
        /// Requested change
        intent: Intent,
    },
    /// Remote state query.
    Query,
    /// Drive the actuator lines behind the controller's back.
    ForceLines(LockState),
}

/// Scenario builder.
///
/// Add steps, then call `.oracle()` to get a [`RunnableScenario`].
pub struct Scenario {
    name: String,
    config: ControllerConfig,
    credentials: Option<CredentialSet>,
    steps: Vec<Step>,
}

impl Scenario {
    /// New scenario with default controller configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: ControllerConfig::default(),
            credentials: None,
            steps: Vec::new(),
        }
    }

    /// Use a specific controller configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific credential set instead of the default passwords.
    pub fn credentials(mut self, credentials: CredentialSet) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Append a step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Hold the button for `hold`.
    pub fn press(self, hold: Duration) -> Self {
        self.step(Step::Press { hold })
    }

    /// Let `duration` of loop time pass.
    pub fn advance(self, duration: Duration) -> Self {
        self.step(Step::Advance(duration))
    }

    /// Remote lock with the given `pass` header.
    pub fn remote_lock(self, password: Option<&str>) -> Self {
        self.step(Step::Remote { password: password.map(str::to_string), intent: Intent::Lock })
    }

    /// Remote unlock with the given `pass` header and auto-lock flag.
    pub fn remote_unlock(self, password: Option<&str>, auto_lock: bool) -> Self {
        self.step(Step::Remote {
            password: password.map(str::to_string),
            intent: Intent::Unlock { auto_lock: AutoLock::from(auto_lock) },
        })
    }

    /// Remote state query.
    pub fn query(self) -> Self {
        self.step(Step::Query)
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute every step in order, then run the oracle.
    pub fn run(self) -> Result<(), String> {
        let Scenario { name, config, credentials, steps } = self.scenario;
        let mut world = match credentials {
            Some(credentials) => World::with_credentials(config, credentials),
            None => World::new(config),
        }
        .map_err(|e| format!("Scenario '{name}': setup failed: {e}"))?;

        for step in steps {
            match step {
                Step::Press { hold } => world.press_for(hold),
                Step::Advance(duration) => world.run_for(duration),
                Step::Remote { password, intent } => {
                    world.remote(password.as_deref(), intent);
                },
                Step::Query => {
                    world.query();
                },
                Step::ForceLines(state) => world.force_lines(state),
            }
        }

        (self.oracle)(&world).map_err(|e| format!("Scenario '{name}': {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_requires_oracle() {
        // This should compile - oracle provided
        let _scenario = Scenario::new("test").query().oracle(Box::new(|_world| Ok(())));

        // This should NOT compile - no oracle
        // let scenario = Scenario::new("test").query();
        // scenario.run(); // ERROR: no method `run` on type `Scenario`
    }

    #[test]
    fn setup_errors_are_reported() {
        let config = ControllerConfig { poll_interval: Duration::ZERO, ..Default::default() };
        let result = Scenario::new("bad config").config(config).oracle(Box::new(|_| Ok(()))).run();
        assert!(result.is_err_and(|e| e.contains("bad config")));
    }

    #[test]
    fn oracle_failure_is_reported() {
        let result = Scenario::new("failing").oracle(Box::new(|_| Err("nope".into()))).run();
        assert_eq!(result, Err("Scenario 'failing': nope".to_string()));
    }
}
