//! Linux sysfs GPIO backend.
//!
//! Lines are exported through `<root>/export` and driven through
//! `<root>/gpioN/{direction,value}`. Runtime read and write failures never
//! stop the loop: writes are logged and assumed applied, reads fall back to
//! the last known level.

use std::{
    fs,
    path::{Path, PathBuf},
};

use latchkey_core::{InputPin, Level, OutputPin};
use tracing::{debug, warn};

use crate::error::ServerError;

fn gpio_error(line: u32, path: &Path) -> impl FnOnce(std::io::Error) -> ServerError + '_ {
    move |source| ServerError::Gpio { line, path: path.to_path_buf(), source }
}

/// Export `line` if needed and set its direction. Returns the value path.
fn export(root: &Path, line: u32, direction: &str) -> Result<PathBuf, ServerError> {
    let dir = root.join(format!("gpio{line}"));
    if !dir.exists() {
        let export = root.join("export");
        fs::write(&export, line.to_string()).map_err(gpio_error(line, &export))?;
        debug!(line, "exported gpio line");
    }
    let direction_path = dir.join("direction");
    fs::write(&direction_path, direction).map_err(gpio_error(line, &direction_path))?;
    Ok(dir.join("value"))
}

fn read_level(path: &Path) -> std::io::Result<Option<Level>> {
    let raw = fs::read_to_string(path)?;
    Ok(match raw.trim() {
        "0" => Some(Level::Low),
        "1" => Some(Level::High),
        _ => None,
    })
}

/// Output line driven through sysfs.
#[derive(Debug)]
pub struct SysfsOutput {
    line: u32,
    value: PathBuf,
    last: Level,
}

impl SysfsOutput {
    /// Export `line` as an output starting at `initial`.
    ///
    /// The `high`/`low` direction values set the level together with the
    /// direction, so the line never glitches through the other level.
    pub fn open(root: &Path, line: u32, initial: Level) -> Result<Self, ServerError> {
        let direction = if initial.is_high() { "high" } else { "low" };
        let value = export(root, line, direction)?;
        Ok(Self { line, value, last: initial })
    }
}

impl OutputPin for SysfsOutput {
    fn set_level(&mut self, level: Level) {
        let raw = if level.is_high() { "1" } else { "0" };
        if let Err(error) = fs::write(&self.value, raw) {
            warn!(line = self.line, %error, ?level, "gpio write failed");
        }
        self.last = level;
    }

    fn level(&self) -> Level {
        match read_level(&self.value) {
            Ok(Some(level)) => level,
            Ok(None) | Err(_) => self.last,
        }
    }
}

/// Input line read through sysfs.
#[derive(Debug)]
pub struct SysfsInput {
    line: u32,
    value: PathBuf,
    last: Level,
}

impl SysfsInput {
    /// Export `line` as an input. Reads as released until first sampled.
    pub fn open(root: &Path, line: u32) -> Result<Self, ServerError> {
        let value = export(root, line, "in")?;
        Ok(Self { line, value, last: Level::High })
    }
}

impl InputPin for SysfsInput {
    fn level(&mut self) -> Level {
        match read_level(&self.value) {
            Ok(Some(level)) => self.last = level,
            Ok(None) => warn!(line = self.line, "unexpected gpio value"),
            Err(error) => warn!(line = self.line, %error, "gpio read failed"),
        }
        self.last
    }
}
