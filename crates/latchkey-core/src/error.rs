//! Error types.
//!
//! Only configuration problems are errors in the fatal sense, and they are
//! all detected before the control loop starts. Audit storage errors are
//! reported so stores can be implemented with `?`, but the audit log swallows
//! them. Rejected intents are outcomes, not errors.

use std::time::Duration;

use thiserror::Error;

/// Startup configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The accepted-credential set is empty.
    #[error("at least one accepted credential is required")]
    NoCredentials,

    /// A configured credential is the empty string.
    #[error("accepted credentials must not be empty strings")]
    EmptyCredential,

    /// The poll interval is zero.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,

    /// The poll interval is too coarse to observe bounces.
    #[error(
        "poll interval {poll_interval:?} exceeds a tenth of the debounce delay {debounce_delay:?}"
    )]
    PollIntervalTooCoarse {
        /// Configured loop interval
        poll_interval: Duration,
        /// Configured debounce delay
        debounce_delay: Duration,
    },
}

/// Durable audit storage errors.
#[derive(Error, Debug)]
pub enum AuditError {
    /// Underlying I/O failed.
    #[error("audit storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage is no longer usable (e.g. poisoned lock).
    #[error("audit storage unavailable: {0}")]
    Unavailable(String),
}
