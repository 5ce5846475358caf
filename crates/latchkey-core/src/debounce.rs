//! Debounced button input.
//!
//! A mechanical switch chatters for a few milliseconds on every press. The
//! [`Debouncer`] only accepts a reading once it has been observed without
//! interruption for the debounce delay, and reports one [`InputEvent`] per
//! accepted activation.
//!
//! # State Machine
//!
//! ```text
//!           raw change            raw stable >= delay
//! ┌──────┐ ───────────> ┌──────────┐ ──────────────> ┌────────┐
//! │ Idle │              │ Bouncing │                 │ Stable │
//! └──────┘              └──────────┘ <────────────── └────────┘
//!                                       raw change
//! ```
//!
//! The loop must poll well inside the delay (poll interval at most a tenth
//! of it) or short bounces are missed.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::pins::{ActiveLevel, InputPin};

/// Event reported by the debouncer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Input went from inactive to active and stayed there.
    Activated,
}

/// Where the debouncer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebouncePhase {
    /// No raw change has ever been seen.
    Idle,
    /// Raw reading changed less than the delay ago.
    Bouncing,
    /// Raw reading has settled.
    Stable,
}

/// Debounce state for one input.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    /// Last raw reading
    last_raw: bool,
    /// Last accepted reading
    stable: bool,
    /// When the raw reading last changed
    last_change: Option<Instant>,
}

impl Debouncer {
    /// Inactive debouncer with the given settle delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay, last_raw: false, stable: false, last_change: None }
    }

    /// Feed one raw sample (`true` = active) taken at `now`.
    ///
    /// Returns `Some(InputEvent::Activated)` exactly once per inactive to
    /// active transition that stays active for at least the delay.
    pub fn poll(&mut self, active: bool, now: Instant) -> Option<InputEvent> {
        if active != self.last_raw {
            self.last_raw = active;
            self.last_change = Some(now);
            trace!(active, "input bouncing");
        }

        let settled =
            self.last_change.is_some_and(|changed| now.duration_since(changed) >= self.delay);
        if !settled || active == self.stable {
            return None;
        }

        self.stable = active;
        active.then_some(InputEvent::Activated)
    }

    /// Current phase as of the last poll at `now`.
    pub fn phase(&self, now: Instant) -> DebouncePhase {
        match self.last_change {
            None => DebouncePhase::Idle,
            Some(changed) if now.duration_since(changed) < self.delay => DebouncePhase::Bouncing,
            Some(_) => DebouncePhase::Stable,
        }
    }

    /// Last accepted reading.
    pub fn is_active(&self) -> bool {
        self.stable
    }
}

/// A physical button: pin, polarity and debouncer.
#[derive(Debug)]
pub struct Button<P> {
    pin: P,
    active_level: ActiveLevel,
    debouncer: Debouncer,
}

impl<P: InputPin> Button<P> {
    /// Button on `pin`, active at `active_level`.
    pub fn new(pin: P, active_level: ActiveLevel, delay: Duration) -> Self {
        Self { pin, active_level, debouncer: Debouncer::new(delay) }
    }

    /// Sample the pin and run it through the debouncer.
    pub fn poll(&mut self, now: Instant) -> Option<InputEvent> {
        let active = self.active_level.is_active(self.pin.level());
        self.debouncer.poll(active, now)
    }

    /// Debounce state.
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const DELAY: Duration = Duration::from_millis(100);
    const TICK: Duration = Duration::from_millis(10);

    /// Poll `samples` at a fixed tick and count activations.
    fn count_activations(samples: &[bool]) -> usize {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        samples
            .iter()
            .enumerate()
            .filter(|(i, active)| debouncer.poll(**active, t0 + TICK * (*i as u32)).is_some())
            .count()
    }

    #[test]
    fn held_press_reports_once() {
        // 500ms held, polled every 10ms
        let mut samples = vec![false; 5];
        samples.extend(vec![true; 50]);
        assert_eq!(count_activations(&samples), 1);
    }

    #[test]
    fn activation_waits_for_full_delay() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        assert_eq!(debouncer.poll(true, t0), None);
        assert_eq!(debouncer.phase(t0), DebouncePhase::Bouncing);
        assert_eq!(debouncer.poll(true, t0 + Duration::from_millis(99)), None);
        assert_eq!(debouncer.poll(true, t0 + DELAY), Some(InputEvent::Activated));
        assert_eq!(debouncer.phase(t0 + DELAY), DebouncePhase::Stable);
        assert_eq!(debouncer.poll(true, t0 + DELAY * 3), None);
    }

    #[test]
    fn chatter_resets_the_timer() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.poll(true, t0);
        debouncer.poll(false, t0 + Duration::from_millis(60));
        debouncer.poll(true, t0 + Duration::from_millis(80));
        // 160ms since first edge but only 80ms since last
        assert_eq!(debouncer.poll(true, t0 + Duration::from_millis(160)), None);
        assert_eq!(
            debouncer.poll(true, t0 + Duration::from_millis(180)),
            Some(InputEvent::Activated)
        );
    }

    #[test]
    fn release_and_press_again_reports_again() {
        let mut samples = vec![true; 20];
        samples.extend(vec![false; 20]);
        samples.extend(vec![true; 20]);
        assert_eq!(count_activations(&samples), 2);
    }

    #[test]
    fn short_glitch_is_ignored() {
        let mut samples = vec![false; 5];
        samples.extend(vec![true; 5]);
        samples.extend(vec![false; 30]);
        assert_eq!(count_activations(&samples), 0);
    }

    #[test]
    fn idle_until_first_change() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.poll(false, t0);
        assert_eq!(debouncer.phase(t0 + DELAY), DebouncePhase::Idle);
    }

    /// Reference count: number of runs of `true` at least `DELAY/TICK` samples
    /// long. Samples before the run's first `true` don't matter because the
    /// stable state only changes to `false` after a sustained `false` run,
    /// and a `true` run can only activate once per preceding accepted
    /// release.
    fn reference_activations(samples: &[bool]) -> usize {
        let need = (DELAY.as_millis() / TICK.as_millis()) as usize;
        let mut stable = false;
        let mut count = 0;
        let mut run_value = false;
        let mut run_len = 0usize;
        for &sample in samples {
            if sample == run_value {
                run_len += 1;
            } else {
                run_value = sample;
                run_len = 1;
            }
            // run_len - 1 ticks have elapsed since the change was observed
            if run_len > need && run_value != stable {
                stable = run_value;
                if stable {
                    count += 1;
                }
            }
        }
        count
    }

    proptest! {
        #[test]
        fn matches_reference(samples in proptest::collection::vec(any::<bool>(), 0..400)) {
            prop_assert_eq!(count_activations(&samples), reference_activations(&samples));
        }

        #[test]
        fn never_more_activations_than_rising_edges(
            samples in proptest::collection::vec(any::<bool>(), 0..400),
        ) {
            let rising = samples
                .iter()
                .zip(std::iter::once(&false).chain(samples.iter()))
                .filter(|(now, before)| **now && !**before)
                .count();
            prop_assert!(count_activations(&samples) <= rising);
        }
    }
}
