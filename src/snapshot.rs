use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::stats::{DailyCounts, StatsHistory};
use crate::world::World;

/// Point-in-time engine state written to disk: the census, per-pool
/// populations and the percentage history so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub captured_at: String,
    pub tick: u64,
    pub day: u32,
    pub initial_population: usize,
    pub total_population: usize,
    pub counts: DailyCounts,
    pub zone_populations: Vec<usize>,
    pub quarantine_population: usize,
    pub history: StatsHistory,
}

impl WorldSnapshot {
    pub fn capture(world: &World, scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            captured_at: chrono::Local::now().to_rfc3339(),
            tick: world.time_count,
            day: world.day_count,
            initial_population: world.initial_population,
            total_population: world.total_population(),
            counts: world.counts(),
            zone_populations: world.zones.iter().map(|z| z.particles.len()).collect(),
            quarantine_population: world.quarantine.particles.len(),
            history: world.stats.clone(),
        }
    }
}

/// Interval-gated JSON dumps under `<dir>/<scenario>/tick_NNNNNN.json`.
/// An interval of zero disables writing entirely.
pub struct SnapshotWriter {
    dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    pub fn maybe_write(&self, world: &World, scenario: &str) -> Result<Option<PathBuf>> {
        if self.interval_ticks == 0 || world.time_count % self.interval_ticks != 0 {
            return Ok(None);
        }
        let dir = self.dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{:06}.json", world.time_count));
        let snapshot = WorldSnapshot::capture(world, scenario);
        let json =
            serde_json::to_string_pretty(&snapshot).context("failed to serialize snapshot")?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}
