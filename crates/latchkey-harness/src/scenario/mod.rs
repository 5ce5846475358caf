//! Scenario framework.
//!
//! Scenarios describe a sequence of stimuli (button presses, remote requests,
//! elapsed time) applied to a real controller in a simulated [`World`], and
//! end with a mandatory oracle that checks the final state. A scenario
//! without an oracle cannot be run.
//!
//! ```ignore
//! Scenario::new("auto-lock")
//!     .remote_unlock(Some("password2"), true)
//!     .advance(Duration::from_secs(6))
//!     .oracle(oracle::state_is(LockState::Locked))
//!     .run()?;
//! ```

mod builder;
pub mod oracle;
mod world;

pub use builder::{RunnableScenario, Scenario, Step};
pub use world::{PEER, World};

/// Oracle verifying the final world state.
pub type OracleFn = Box<dyn FnOnce(&World) -> Result<(), String>>;
