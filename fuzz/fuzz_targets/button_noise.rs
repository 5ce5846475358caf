//! Fuzz the debouncer with arbitrary raw samples.
//!
//! Each sample is (active, gap in ms). An activation may only be reported
//! once the raw level has been active and unchanged for the full delay, and
//! at most once per press.

#![no_main]

use std::time::{Duration, Instant};

use latchkey_core::{Debouncer, InputEvent};
use libfuzzer_sys::fuzz_target;

const DELAY: Duration = Duration::from_millis(100);

fuzz_target!(|samples: Vec<(bool, u8)>| {
    let t0 = Instant::now();
    let mut now = t0;
    let mut debouncer = Debouncer::new(DELAY);
    let mut last_raw = false;
    let mut changed_at = t0;
    let mut reported_this_press = false;

    for (active, gap) in samples {
        now += Duration::from_millis(u64::from(gap));
        if active != last_raw {
            last_raw = active;
            changed_at = now;
            reported_this_press = false;
        }

        if let Some(InputEvent::Activated) = debouncer.poll(active, now) {
            assert!(active, "activation while inactive");
            assert!(now - changed_at >= DELAY, "activation before the level settled");
            assert!(!reported_this_press, "second activation for one press");
            reported_this_press = true;
        }
    }
});
