//! Bench backend: no hardware, transitions go to the log.

use latchkey_core::{InputPin, Level, OutputPin};
use tracing::info;

/// In-memory output line.
#[derive(Debug)]
pub struct SimLine {
    name: &'static str,
    level: Level,
}

impl SimLine {
    /// Line called `name` starting at `level`.
    pub fn new(name: &'static str, level: Level) -> Self {
        Self { name, level }
    }
}

impl OutputPin for SimLine {
    fn set_level(&mut self, level: Level) {
        if level != self.level {
            info!(line = self.name, ?level, "sim line changed");
        }
        self.level = level;
    }

    fn level(&self) -> Level {
        self.level
    }
}

/// Button that is never pressed (released reads High).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl InputPin for IdleInput {
    fn level(&mut self) -> Level {
        Level::High
    }
}
