use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use outbreak::{
    engine::{EngineBuilder, EngineSettings},
    params::{Mode, ScenarioLoader, SimParams},
    stats::DailyCounts,
    systems::{
        InfectionSystem, MarketplaceSystem, MovementSystem, ProgressionSystem, StatsSystem,
        TravelSystem,
    },
};
use tempfile::tempdir;

fn settings(mode: Mode, snapshot_dir: PathBuf, snapshot_interval: u64) -> EngineSettings {
    EngineSettings {
        scenario_name: "hook-test".into(),
        seed: 17,
        mode,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    }
}

fn full_stack(builder: EngineBuilder) -> EngineBuilder {
    builder
        .with_system(MovementSystem::new())
        .with_system(InfectionSystem::new())
        .with_system(ProgressionSystem::new())
        .with_system(TravelSystem::new())
        .with_system(MarketplaceSystem::new())
        .with_system(StatsSystem::new())
}

#[test]
fn callbacks_receive_logs_and_daily_stats() {
    let logs: Rc<RefCell<Vec<String>>> = Rc::default();
    let stats: Rc<RefCell<Vec<DailyCounts>>> = Rc::default();

    let logs_hook = Rc::clone(&logs);
    let stats_hook = Rc::clone(&stats);
    let temp = tempdir().unwrap();
    let mut engine = full_stack(EngineBuilder::new(settings(
        Mode::Simple,
        temp.path().to_path_buf(),
        0,
    )))
    .on_log(move |line| logs_hook.borrow_mut().push(line.to_string()))
    .on_stats(move |counts| stats_hook.borrow_mut().push(*counts))
    .build();

    let params = SimParams {
        num_particles: 50,
        ..SimParams::default()
    };
    engine.initialize(&params).unwrap();

    // Seeding announces itself through the log hook, day-prefixed.
    assert!(!logs.borrow().is_empty());
    assert!(logs.borrow().iter().all(|line| line.starts_with("[day ")));
    assert!(stats.borrow().is_empty());

    // Two full days: the stats hook fires once per day boundary.
    for _ in 0..2 * params.time_steps_per_day {
        engine.step(&params).unwrap();
    }
    assert_eq!(stats.borrow().len(), 2);
    let first = stats.borrow()[0];
    assert_eq!(
        first.susceptible + first.infected + first.removed + first.dead,
        50
    );
}

#[test]
fn tick_summaries_mirror_the_callbacks() {
    let temp = tempdir().unwrap();
    let mut engine = full_stack(EngineBuilder::new(settings(
        Mode::Simple,
        temp.path().to_path_buf(),
        0,
    )))
    .build();

    let params = SimParams::default();
    engine.initialize(&params).unwrap();

    let summary = engine.step(&params).unwrap();
    assert_eq!(summary.tick, 0);
    assert!(summary.day_boundary);
    assert!(summary.daily.is_some());

    let summary = engine.step(&params).unwrap();
    assert_eq!(summary.tick, 1);
    assert!(!summary.day_boundary);
    assert!(summary.daily.is_none());
}

#[test]
fn snapshots_are_written_on_the_configured_interval() {
    let temp = tempdir().unwrap();
    let params = SimParams {
        num_particles: 30,
        ..SimParams::default()
    };
    let mut engine = full_stack(EngineBuilder::new(settings(
        Mode::Simple,
        temp.path().to_path_buf(),
        u64::from(params.time_steps_per_day),
    )))
    .build();

    engine.initialize(&params).unwrap();
    for _ in 0..2 * params.time_steps_per_day {
        engine.step(&params).unwrap();
    }

    let dir = temp.path().join("hook-test");
    let mut written: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    written.sort();
    assert_eq!(written, vec!["tick_000024.json", "tick_000048.json"]);
}

#[test]
fn shipped_scenarios_load_and_validate() {
    let loader = ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"));
    for file in [
        "scenarios/baseline.yaml",
        "scenarios/covid19.yaml",
        "scenarios/measles.yaml",
        "scenarios/distancing.yaml",
        "scenarios/communities.yaml",
    ] {
        let scenario = loader.load(file).unwrap();
        assert!(!scenario.name.is_empty());
        scenario.params.validate().unwrap();
    }
}
