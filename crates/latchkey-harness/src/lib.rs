//! Deterministic simulation harness for latchkey testing.
//!
//! Virtual-clock implementation of the Environment trait, in-memory digital
//! lines that count writes, a reference model of the lock, and a scenario
//! framework that drives the real controller through the cooperative cycle
//! the production loop uses.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod operation;
pub mod scenario;
pub mod sim_env;
pub mod sim_pins;

use latchkey_core::{Controller, MemoryAuditStore};

pub use model::ModelLock;
pub use operation::{Operation, Password};
pub use sim_env::SimEnv;
pub use sim_pins::{SimInputPin, SimOutputPin};

/// Controller wired to simulated lines and an in-memory audit store.
pub type SimController = Controller<SimOutputPin, SimInputPin, MemoryAuditStore>;
