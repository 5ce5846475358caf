//! Reusable oracles.

use latchkey_core::LockState;

use crate::scenario::{OracleFn, World};

/// Final lock state is `expected`.
pub fn state_is(expected: LockState) -> OracleFn {
    Box::new(move |world: &World| {
        let state = world.state();
        if state == expected { Ok(()) } else { Err(format!("expected {expected}, found {state}")) }
    })
}

/// No auto-lock is pending.
pub fn no_pending_auto_lock() -> OracleFn {
    Box::new(|world: &World| match world.pending_auto_lock() {
        None => Ok(()),
        Some(deadline) => Err(format!("auto-lock still pending for {deadline:?}")),
    })
}

/// The audit messages are exactly `expected`, in order.
pub fn audit_is(expected: &[&str]) -> OracleFn {
    let expected: Vec<String> = expected.iter().map(|s| (*s).to_string()).collect();
    Box::new(move |world: &World| {
        let messages = world.audit_messages();
        if messages == expected {
            Ok(())
        } else {
            Err(format!("audit mismatch: expected {expected:?}, found {messages:?}"))
        }
    })
}

/// The actuator performed exactly `expected` transitions (boot lock
/// included).
pub fn actuations_are(expected: u64) -> OracleFn {
    Box::new(move |world: &World| {
        let actuations = world.actuations();
        if actuations == expected {
            Ok(())
        } else {
            Err(format!("expected {expected} actuations, found {actuations}"))
        }
    })
}

/// Every oracle must pass. Stops at the first failure.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |world: &World| oracles.into_iter().try_for_each(|oracle| oracle(world)))
}
