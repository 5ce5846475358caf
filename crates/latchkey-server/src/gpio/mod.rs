//! GPIO backends.
//!
//! The backend is chosen at startup, so the controller is instantiated over
//! small dispatch enums rather than boxed trait objects.

mod sim;
mod sysfs;

pub use sim::{IdleInput, SimLine};
pub use sysfs::{SysfsInput, SysfsOutput};

use latchkey_core::{Actuator, InputPin, Level, OutputPin};

use crate::{
    config::{Args, GpioBackend},
    error::ServerError,
};

/// An actuator output line.
#[derive(Debug)]
pub enum OutputLine {
    /// Logged in-memory line
    Sim(SimLine),
    /// sysfs line
    Sysfs(SysfsOutput),
}

impl OutputPin for OutputLine {
    fn set_level(&mut self, level: Level) {
        match self {
            Self::Sim(line) => line.set_level(level),
            Self::Sysfs(line) => line.set_level(level),
        }
    }

    fn level(&self) -> Level {
        match self {
            Self::Sim(line) => line.level(),
            Self::Sysfs(line) => line.level(),
        }
    }
}

/// The button input line.
#[derive(Debug)]
pub enum InputLine {
    /// Never pressed
    Sim(IdleInput),
    /// sysfs line
    Sysfs(SysfsInput),
}

impl InputPin for InputLine {
    fn level(&mut self) -> Level {
        match self {
            Self::Sim(line) => line.level(),
            Self::Sysfs(line) => line.level(),
        }
    }
}

/// Open the actuator lines and button line selected by `args`.
///
/// Both actuator lines start released (High); the controller drives them to
/// the locked configuration once it is built.
pub fn open(args: &Args) -> Result<(Actuator<OutputLine>, InputLine), ServerError> {
    match args.gpio {
        GpioBackend::Sim => Ok((
            Actuator::new(
                OutputLine::Sim(SimLine::new("lock", Level::High)),
                OutputLine::Sim(SimLine::new("reverse", Level::High)),
            ),
            InputLine::Sim(IdleInput),
        )),
        GpioBackend::Sysfs => {
            let root = &args.gpio_root;
            let lock = SysfsOutput::open(root, args.lock_pin, Level::High)?;
            let reverse = SysfsOutput::open(root, args.reverse_lock_pin, Level::High)?;
            let button = SysfsInput::open(root, args.button_pin)?;
            Ok((
                Actuator::new(OutputLine::Sysfs(lock), OutputLine::Sysfs(reverse)),
                InputLine::Sysfs(button),
            ))
        },
    }
}
