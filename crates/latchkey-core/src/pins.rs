//! Digital line abstraction.
//!
//! The actuator and the button are the only physical boundary. Both are
//! modelled as single digital lines so the same state machines run against
//! sysfs GPIO, an in-memory bench backend, or the simulation harness.

use std::ops::Not;

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Line pulled to ground.
    Low,
    /// Line at supply voltage.
    High,
}

impl Level {
    /// True for [`Level::High`].
    pub fn is_high(self) -> bool {
        self == Self::High
    }

    /// True for [`Level::Low`].
    pub fn is_low(self) -> bool {
        self == Self::Low
    }
}

impl Not for Level {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }
}

/// Which raw level counts as "active" on an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveLevel {
    /// Active when pulled low (pull-up wiring, switch to ground).
    #[default]
    Low,
    /// Active when driven high.
    High,
}

impl ActiveLevel {
    /// Whether `level` is the active level.
    pub fn is_active(self, level: Level) -> bool {
        match self {
            Self::Low => level.is_low(),
            Self::High => level.is_high(),
        }
    }
}

/// A digital output line with read-back.
///
/// Writes are assumed to succeed. `level` must report what the line is
/// actually driven to, with no side effects.
pub trait OutputPin: Send {
    /// Drive the line to `level`.
    fn set_level(&mut self, level: Level);

    /// Read back the driven level.
    fn level(&self) -> Level;
}

/// A digital input line.
pub trait InputPin: Send {
    /// Sample the raw level of the line.
    fn level(&mut self) -> Level;
}
