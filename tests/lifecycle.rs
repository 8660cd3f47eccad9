use std::thread;
use std::time::{Duration, Instant};

use virosim::engine::{Engine, EngineSettings, Lifecycle};
use virosim::rng::AlwaysInfect;

fn fast_settings(group_size: usize) -> EngineSettings {
    EngineSettings {
        group_size,
        infection_factor: 1,
        interval: Duration::from_millis(5),
        seed: 42,
    }
}

fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let end = Instant::now() + deadline;
    while Instant::now() < end {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn start_drives_periodic_steps() {
    let engine = Engine::with_rng(fast_settings(9), AlwaysInfect);
    engine.toggle(4).unwrap();
    assert_eq!(engine.lifecycle(), Lifecycle::Idle);

    engine.start();
    assert_eq!(engine.lifecycle(), Lifecycle::Running);

    // Radius 1 with always-infect needs four ticks to cover all nine cells.
    let fully_sick = wait_until(Duration::from_secs(2), || engine.counts().1 == 9);
    assert!(fully_sick, "infection never reached the whole group");
    engine.stop();
}

#[test]
fn stop_halts_ticking_and_is_idempotent() {
    let engine = Engine::with_rng(fast_settings(9), AlwaysInfect);
    engine.toggle(4).unwrap();
    engine.start();
    wait_until(Duration::from_secs(2), || engine.counts().1 > 1);

    engine.stop();
    assert_eq!(engine.lifecycle(), Lifecycle::Stopped);
    let version = engine.snapshot().version;
    thread::sleep(Duration::from_millis(50));
    assert_eq!(engine.snapshot().version, version);

    engine.stop();
    assert_eq!(engine.lifecycle(), Lifecycle::Stopped);
}

#[test]
fn start_is_a_noop_when_not_idle() {
    let engine = Engine::with_rng(fast_settings(4), AlwaysInfect);
    engine.start();
    engine.start();
    assert_eq!(engine.lifecycle(), Lifecycle::Running);
    engine.stop();

    // Restart after stop is not supported.
    engine.start();
    assert_eq!(engine.lifecycle(), Lifecycle::Stopped);
    let version = engine.snapshot().version;
    thread::sleep(Duration::from_millis(50));
    assert_eq!(engine.snapshot().version, version);
}

#[test]
fn toggle_works_in_every_lifecycle_state() {
    let engine = Engine::with_rng(fast_settings(5), AlwaysInfect);
    engine.toggle(0).unwrap();
    assert_eq!(engine.counts().1, 1);

    engine.start();
    engine.stop();
    engine.toggle(0).unwrap();
    assert_eq!(engine.counts(), (5, 0));
}

#[test]
fn subscribers_see_toggles_and_steps() {
    let engine = Engine::with_rng(fast_settings(5), AlwaysInfect);
    let mut rx = engine.subscribe();

    engine.toggle(2).unwrap();
    let after_toggle = rx.try_recv().expect("toggle publishes a snapshot");
    assert_eq!(after_toggle.sick, 1);

    engine.step();
    let after_step = rx.try_recv().expect("step publishes a snapshot");
    assert_eq!(after_step.sick, 3);
}
