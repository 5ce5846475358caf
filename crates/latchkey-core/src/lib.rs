//! Latchkey controller core logic
//!
//! Pure state machine logic for a single-actuator access controller,
//! completely decoupled from I/O. This enables deterministic testing of the
//! part that actually needs design: three independent trigger sources (a
//! debounced button, authenticated network requests and a deferred auto-lock
//! timer) driving one physical actuator without racing or double-firing.
//!
//! # Architecture
//!
//! Nothing in this crate reads a clock, sleeps, opens a file or talks to a
//! socket. Time is passed into every method that needs it, hardware is
//! reached only through the [`pins`] traits and durable audit storage only
//! through [`audit::AuditStore`]. A runtime (the server loop or the
//! simulation harness) owns a [`Controller`] and drives it cooperatively:
//!
//! ```text
//! loop {
//!     controller.poll_input(now);        // (a) debounced button
//!     controller.handle(intent, now);    // (b) queued network intents
//!     controller.poll_timers(now);       // (c) deferred auto-lock
//! }
//! ```
//!
//! Every path that can reach the actuator goes through the
//! [`LockCoordinator`], which is its only owner.
//!
//! # Components
//!
//! - [`actuator`]: dual-line actuator driver with safe drive ordering
//! - [`audit`]: append-only audit log with console fallback
//! - [`auth`]: fixed credential set
//! - [`debounce`]: debounced button input
//! - [`scheduler`]: cooperative deferred-action queue
//! - [`coordinator`]: the lock state machine
//! - [`controller`]: application context tying the pieces together
//! - [`mod@env`]: Environment abstraction (time)

pub mod actuator;
pub mod audit;
pub mod auth;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod debounce;
pub mod env;
pub mod error;
pub mod pins;
pub mod scheduler;

pub use actuator::{Actuator, LockState};
pub use audit::{AuditLog, AuditRecord, AuditStore, MemoryAuditStore};
pub use auth::{AutoLock, Credential, CredentialSet};
pub use config::ControllerConfig;
pub use controller::Controller;
pub use coordinator::{AutoLockOutcome, Intent, IntentOutcome, LockCoordinator, Origin};
pub use debounce::{Button, DebouncePhase, Debouncer, InputEvent};
pub use env::Environment;
pub use error::{AuditError, ConfigError};
pub use pins::{ActiveLevel, InputPin, Level, OutputPin};
pub use scheduler::{AutoLockToken, DeferredAction, DueTask, Scheduler, TaskHandle};
