use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

/// Daily census emission: counts across every pool, percentage history
/// keyed to the initial population, and the stats event for the
/// observation callbacks. A world with no population emits nothing.
pub struct StatsSystem;

impl StatsSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StatsSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for StatsSystem {
    fn name(&self) -> &str {
        "stats"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !ctx.day_boundary {
            return Ok(());
        }
        let initial = world.initial_population;
        if initial == 0 {
            return Ok(());
        }
        let counts = world.counts();
        world.stats.record(ctx.day, &counts, initial);
        world.push_stats(counts);
        Ok(())
    }
}
