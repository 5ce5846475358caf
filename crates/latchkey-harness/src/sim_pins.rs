//! In-memory digital lines.
//!
//! Clones share state, so a test keeps one handle while the controller owns
//! the other.

use std::sync::{Arc, Mutex, PoisonError};

use latchkey_core::{InputPin, Level, OutputPin};

#[derive(Debug)]
struct OutputState {
    level: Level,
    writes: u64,
    history: Vec<Level>,
}

/// Simulated output line recording every write.
#[derive(Debug, Clone)]
pub struct SimOutputPin {
    state: Arc<Mutex<OutputState>>,
}

impl SimOutputPin {
    /// Line powered up at `level`.
    pub fn new(level: Level) -> Self {
        Self { state: Arc::new(Mutex::new(OutputState { level, writes: 0, history: Vec::new() })) }
    }

    /// Number of writes performed through [`OutputPin::set_level`].
    pub fn writes(&self) -> u64 {
        self.with(|s| s.writes)
    }

    /// Every level written, in order.
    pub fn history(&self) -> Vec<Level> {
        self.with(|s| s.history.clone())
    }

    /// Change the line behind the controller's back (manual override,
    /// wiring fault). Not counted as a write.
    pub fn force(&self, level: Level) {
        self.with(|s| s.level = level);
    }

    fn with<T>(&self, f: impl FnOnce(&mut OutputState) -> T) -> T {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl OutputPin for SimOutputPin {
    fn set_level(&mut self, level: Level) {
        self.with(|s| {
            s.level = level;
            s.writes += 1;
            s.history.push(level);
        });
    }

    fn level(&self) -> Level {
        self.with(|s| s.level)
    }
}

/// Simulated input line, idle high (pull-up).
#[derive(Debug, Clone)]
pub struct SimInputPin {
    level: Arc<Mutex<Level>>,
}

impl SimInputPin {
    /// Released button.
    pub fn new() -> Self {
        Self { level: Arc::new(Mutex::new(Level::High)) }
    }

    /// Drive the raw level.
    pub fn set(&self, level: Level) {
        *self.level.lock().unwrap_or_else(PoisonError::into_inner) = level;
    }

    /// Close the switch (pull to ground).
    pub fn press(&self) {
        self.set(Level::Low);
    }

    /// Open the switch.
    pub fn release(&self) {
        self.set(Level::High);
    }
}

impl Default for SimInputPin {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPin for SimInputPin {
    fn level(&mut self) -> Level {
        *self.level.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
