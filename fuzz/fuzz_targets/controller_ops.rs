//! Fuzz the controller against the reference model.
//!
//! Any operation sequence must leave the controller and `ModelLock` agreeing
//! on state, actuations, audit count and pending auto-lock.

#![no_main]

use std::time::Duration;

use latchkey_core::ControllerConfig;
use latchkey_harness::{ModelLock, Operation, scenario::World};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (bool, Vec<Operation>)| {
    let (button_auto_lock, ops) = input;
    let config = ControllerConfig {
        debounce_delay: Duration::from_millis(100),
        auto_lock_delay: Duration::from_millis(300),
        poll_interval: Duration::from_millis(10),
        button_auto_lock,
    };

    let mut model = ModelLock::new(&config);
    let Ok(mut world) = World::new(config) else {
        return;
    };

    for op in ops.iter().take(64) {
        model.apply(op);
        world.apply(op);

        assert_eq!(world.state(), model.state(), "state after {op:?}");
        assert_eq!(world.actuations(), model.actuations(), "actuations after {op:?}");
        assert_eq!(world.audit_messages().len(), model.audit_records(), "audit after {op:?}");
        assert_eq!(
            world.pending_auto_lock().is_some(),
            model.has_pending_auto_lock(),
            "pending after {op:?}"
        );
    }
});
