//! Controller timing configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Timing and behavior of the controller, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// How long a button reading must be stable before it is accepted.
    pub debounce_delay: Duration,
    /// Delay between an auto-lock unlock and the automatic re-lock.
    pub auto_lock_delay: Duration,
    /// Cooperative loop interval (should be <= debounce_delay / 10).
    pub poll_interval: Duration,
    /// Whether a button unlock requests auto-lock.
    pub button_auto_lock: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_delay: Duration::from_millis(100),
            auto_lock_delay: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(10),
            button_auto_lock: true,
        }
    }
}

impl ControllerConfig {
    /// Check the loop can observe bounces shorter than the debounce delay.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll_interval * 10 > self.debounce_delay {
            return Err(ConfigError::PollIntervalTooCoarse {
                poll_interval: self.poll_interval,
                debounce_delay: self.debounce_delay,
            });
        }
        Ok(())
    }
}
