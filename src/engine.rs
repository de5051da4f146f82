use std::path::PathBuf;

use anyhow::Result;

use crate::params::{Mode, SimParams};
use crate::rng::{RngManager, SystemRng};
use crate::snapshot::SnapshotWriter;
use crate::stats::{DailyCounts, Event};
use crate::world::World;

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub mode: Mode,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

/// Per-tick view handed to every system. Parameters are borrowed from the
/// caller on each step, so live edits between steps are picked up
/// immediately.
pub struct SystemContext<'a> {
    pub tick: u64,
    pub day: u32,
    /// True on the first tick of each simulated day; the daily passes
    /// (infection, progression, travel, marketplace gathering, statistics)
    /// only run on boundary ticks.
    pub day_boundary: bool,
    /// Fixed integration step, `1 / time_steps_per_day` days.
    pub dt: f64,
    pub mode: Mode,
    pub params: &'a SimParams,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}

type StatsHook = Box<dyn FnMut(&DailyCounts)>;
type LogHook = Box<dyn FnMut(&str)>;

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
    on_stats: Option<StatsHook>,
    on_log: Option<LogHook>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
            on_stats: None,
            on_log: None,
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    /// Called once per simulated day with the census of that day.
    pub fn on_stats(mut self, hook: impl FnMut(&DailyCounts) + 'static) -> Self {
        self.on_stats = Some(Box::new(hook));
        self
    }

    /// Called for every day-prefixed log line (spawns, infections,
    /// recoveries, deaths, quarantine transfers, gatherings, travel).
    pub fn on_log(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.on_log = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            world: World::empty(self.settings.mode),
            rng: RngManager::new(self.settings.seed),
            snapshots: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            systems: self.systems,
            on_stats: self.on_stats,
            on_log: self.on_log,
            settings: self.settings,
        }
    }
}

pub struct Engine {
    world: World,
    rng: RngManager,
    snapshots: SnapshotWriter,
    systems: Vec<Box<dyn System>>,
    on_stats: Option<StatsHook>,
    on_log: Option<LogHook>,
    settings: EngineSettings,
}

impl Engine {
    /// Discard all zones and particles and rebuild them for the configured
    /// mode. Resets the clock, the statistics history and every RNG stream;
    /// there is no incremental migration path.
    pub fn initialize(&mut self, params: &SimParams) -> Result<()> {
        self.rng = RngManager::new(self.settings.seed);
        let mut stream = self.rng.stream("seeding");
        self.world = World::seeded(self.settings.mode, params, &mut stream);
        let events = self.world.drain_events();
        self.dispatch(events);
        Ok(())
    }

    /// Advance exactly one tick. Movement runs every tick; the daily passes
    /// run when the clock crosses a day boundary.
    pub fn step(&mut self, params: &SimParams) -> Result<TickSummary> {
        let steps_per_day = u64::from(params.time_steps_per_day.max(1));
        let day_boundary = self.world.time_count % steps_per_day == 0;
        let day = self.world.day_count;
        let tick = self.world.time_count;

        if day_boundary {
            self.world.log(format!("---------- day {:03} ----------", day + 1));
        }

        for system in &mut self.systems {
            let ctx = SystemContext {
                tick,
                day,
                day_boundary,
                dt: 1.0 / f64::from(params.time_steps_per_day.max(1)),
                mode: self.settings.mode,
                params,
            };
            let mut stream = self.rng.stream(system.name());
            system.run(&ctx, &mut self.world, &mut stream)?;
        }

        self.world.advance_time(day_boundary);
        self.snapshots
            .maybe_write(&self.world, &self.settings.scenario_name)?;

        let events = self.world.drain_events();
        let (daily, events) = self.dispatch(events);
        Ok(TickSummary {
            tick,
            day,
            day_boundary,
            daily,
            events,
        })
    }

    pub fn run(&mut self, params: &SimParams, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.step(params)?;
        }
        Ok(())
    }

    pub fn run_days(&mut self, params: &SimParams, days: u32) -> Result<()> {
        let ticks = u64::from(days) * u64::from(params.time_steps_per_day.max(1));
        self.run(params, ticks)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn current_tick(&self) -> u64 {
        self.world.time_count
    }

    pub fn day_count(&self) -> u32 {
        self.world.day_count
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    fn dispatch(&mut self, events: Vec<Event>) -> (Option<DailyCounts>, Vec<String>) {
        let mut daily = None;
        let mut lines = Vec::new();
        for event in events {
            match event {
                Event::Stats(counts) => {
                    if let Some(hook) = self.on_stats.as_mut() {
                        hook(&counts);
                    }
                    daily = Some(counts);
                }
                Event::Log(line) => {
                    if let Some(hook) = self.on_log.as_mut() {
                        hook(&line);
                    }
                    lines.push(line);
                }
            }
        }
        (daily, lines)
    }
}

#[derive(Clone, Debug)]
pub struct TickSummary {
    pub tick: u64,
    pub day: u32,
    pub day_boundary: bool,
    /// Census emitted by the statistics pass; present on boundary ticks.
    pub daily: Option<DailyCounts>,
    /// Log lines queued during the tick, in emission order.
    pub events: Vec<String>,
}
