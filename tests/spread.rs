use std::time::Duration;

use virosim::engine::{Engine, EngineSettings};
use virosim::rng::{AlwaysInfect, InfectionRng, SeededRng};
use virosim::HealthStatus;

fn settings(group_size: usize, infection_factor: usize) -> EngineSettings {
    EngineSettings {
        group_size,
        infection_factor,
        interval: Duration::from_millis(10),
        seed: 42,
    }
}

fn engine_with(group_size: usize, infection_factor: usize, rng: impl InfectionRng + 'static) -> Engine {
    Engine::with_rng(settings(group_size, infection_factor), rng)
}

fn sick_indices(cells: &[HealthStatus]) -> Vec<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_sick())
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn window_touches_exactly_the_radius() {
    // One case at index 5 with radius 2 can only reach [3, 7].
    let engine = engine_with(10, 2, AlwaysInfect);
    engine.toggle(5).unwrap();
    let snapshot = engine.step();
    assert_eq!(sick_indices(&snapshot.cells), vec![3, 4, 5, 6, 7]);
}

#[test]
fn single_case_spreads_one_radius_per_tick() {
    let engine = engine_with(5, 1, AlwaysInfect);
    engine.toggle(2).unwrap();
    let snapshot = engine.step();
    assert_eq!(
        snapshot.cells,
        vec![
            HealthStatus::Healthy,
            HealthStatus::Sick,
            HealthStatus::Sick,
            HealthStatus::Sick,
            HealthStatus::Healthy,
        ]
    );
}

#[test]
fn infection_does_not_cascade_within_one_tick() {
    // Index 1 becomes sick during this tick; if it acted as a source in the
    // same tick, index 2 would catch it too.
    let engine = engine_with(3, 1, AlwaysInfect);
    engine.toggle(0).unwrap();
    let snapshot = engine.step();
    assert_eq!(sick_indices(&snapshot.cells), vec![0, 1]);
}

#[test]
fn sick_individuals_never_recover_on_their_own() {
    let engine = engine_with(20, 2, SeededRng::new(9));
    engine.toggle(3).unwrap();
    engine.toggle(11).unwrap();

    let mut previously_sick = sick_indices(&engine.snapshot().cells);
    for _ in 0..50 {
        let snapshot = engine.step();
        assert_eq!(snapshot.cells.len(), 20);
        let now_sick = sick_indices(&snapshot.cells);
        for index in &previously_sick {
            assert!(now_sick.contains(index), "index {index} recovered");
        }
        previously_sick = now_sick;
    }
}

#[test]
fn zero_radius_never_spreads() {
    let engine = engine_with(10, 0, AlwaysInfect);
    engine.toggle(4).unwrap();
    for _ in 0..100 {
        let snapshot = engine.step();
        assert_eq!(sick_indices(&snapshot.cells), vec![4]);
    }
}

#[test]
fn empty_population_steps_are_noops() {
    let engine = engine_with(0, 3, AlwaysInfect);
    let snapshot = engine.step();
    assert!(snapshot.cells.is_empty());
    assert_eq!(engine.counts(), (0, 0));
}

#[test]
fn equal_seeds_give_equal_runs() {
    let run = |seed: u64| {
        let engine = Engine::new(EngineSettings {
            group_size: 30,
            infection_factor: 2,
            interval: Duration::from_millis(10),
            seed,
        });
        engine.toggle(15).unwrap();
        let mut snapshot = engine.snapshot();
        assert_eq!(snapshot.sick, 1);
        for _ in 0..30 {
            snapshot = engine.step();
        }
        snapshot.cells
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn double_toggle_restores_the_individual() {
    let engine = engine_with(6, 1, AlwaysInfect);
    engine.toggle(2).unwrap();
    engine.toggle(2).unwrap();
    assert_eq!(engine.counts(), (6, 0));
}
