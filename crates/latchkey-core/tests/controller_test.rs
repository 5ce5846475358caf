//! Controller integration tests.
//!
//! Exercises the three loop steps directly against simulated lines.

use std::time::{Duration, Instant};

use latchkey_core::{
    Actuator, AuditLog, ConfigError, Controller, ControllerConfig, CredentialSet, Intent,
    IntentOutcome, Level, LockState, MemoryAuditStore, Origin,
};
use latchkey_harness::{SimController, SimInputPin, SimOutputPin};

struct Rig {
    controller: SimController,
    button: SimInputPin,
    lock_line: SimOutputPin,
    store: MemoryAuditStore,
    t0: Instant,
}

fn rig(config: ControllerConfig) -> Result<Rig, ConfigError> {
    let t0 = Instant::now();
    let lock_line = SimOutputPin::new(Level::High);
    let reverse_line = SimOutputPin::new(Level::High);
    let button = SimInputPin::new();
    let store = MemoryAuditStore::new();
    let controller = Controller::new(
        config,
        Actuator::new(lock_line.clone(), reverse_line),
        button.clone(),
        CredentialSet::new(["password1"])?,
        AuditLog::with_store(store.clone(), t0),
    )?;
    Ok(Rig { controller, button, lock_line, store, t0 })
}

#[test]
fn rejects_coarse_poll_interval() {
    let config = ControllerConfig { poll_interval: Duration::from_millis(50), ..Default::default() };
    assert!(matches!(rig(config), Err(ConfigError::PollIntervalTooCoarse { .. })));
}

#[test]
fn button_press_unlocks_locally() {
    let mut rig = rig(ControllerConfig::default()).unwrap();
    let tick = Duration::from_millis(10);

    rig.button.press();
    let outcomes: Vec<IntentOutcome> =
        (0..50).filter_map(|i| rig.controller.poll_input(rig.t0 + tick * i)).collect();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(rig.controller.coordinator().state(), LockState::Unlocked);
    assert_eq!(rig.lock_line.history().last().copied(), Some(Level::High));
    assert_eq!(rig.store.messages(), vec!["UNLOCK SUCCESS: LOCAL"]);
}

#[test]
fn button_auto_lock_can_be_disabled() {
    let config = ControllerConfig { button_auto_lock: false, ..Default::default() };
    let mut rig = rig(config).unwrap();

    rig.button.press();
    rig.controller.poll_input(rig.t0);
    let outcome = rig.controller.poll_input(rig.t0 + Duration::from_millis(100));

    assert_eq!(
        outcome,
        Some(IntentOutcome::Accepted { state: LockState::Unlocked, auto_lock_at: None })
    );
    assert!(rig.controller.poll_timers(rig.t0 + Duration::from_secs(60)).is_empty());
    assert_eq!(rig.controller.coordinator().state(), LockState::Unlocked);
}

#[test]
fn audit_content_is_retrievable() {
    let mut rig = rig(ControllerConfig::default()).unwrap();
    rig.controller.handle(&Origin::Local, Intent::Lock, rig.t0 + Duration::from_millis(7));
    assert_eq!(rig.controller.audit_content(), "[7] LOCK SUCCESS: LOCAL\n");
}

#[test]
fn console_only_log_still_runs_the_lock() {
    let t0 = Instant::now();
    let mut controller = Controller::new(
        ControllerConfig::default(),
        Actuator::new(SimOutputPin::new(Level::High), SimOutputPin::new(Level::High)),
        SimInputPin::new(),
        CredentialSet::new(["password1"]).unwrap(),
        AuditLog::<MemoryAuditStore>::console_only(t0),
    )
    .unwrap();

    let outcome = controller.handle(&Origin::Local, Intent::Lock, t0);
    assert!(outcome.is_accepted());
    assert_eq!(controller.coordinator().state(), LockState::Locked);
    assert_eq!(controller.audit_content(), "");
    assert!(!controller.audit_log().is_durable());
}
