//! Server error types.

use std::{io, path::PathBuf};

use latchkey_core::ConfigError;
use thiserror::Error;

/// Errors that stop the server.
///
/// Anything past startup is handled in-band: rejected intents are outcomes,
/// audit failures are logged, and GPIO read failures repeat the last level.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid controller configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Listener or socket I/O
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A GPIO line could not be exported or configured
    #[error("GPIO line {line} at {path}: {source}")]
    Gpio {
        /// Line number
        line: u32,
        /// Path being written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// The control loop stopped or panicked
    #[error("control loop failed: {0}")]
    Runtime(String),

    /// The control loop is no longer accepting requests
    #[error("control loop is not running")]
    RuntimeGone,

    /// Tracing subscriber setup failed
    #[error("logging setup failed: {0}")]
    Logging(String),
}
