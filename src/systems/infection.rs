use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    grid::{SpatialGrid, INFECTION_CHECK_RADIUS},
    params::SimParams,
    particle::{Health, Particle},
    rng::SystemRng,
    world::World,
};

/// Daily contact-transmission pass. Runs per pool (every zone plus the
/// quarantine pen): the grid is rebuilt with susceptible particles only,
/// every infected particle queries its neighborhood, and each contact
/// within the infection radius rolls against the per-target effective
/// probability `prob_infection * susceptibility`.
pub struct InfectionSystem {
    grid: SpatialGrid,
    neighbors: Vec<usize>,
}

impl InfectionSystem {
    pub fn new() -> Self {
        Self {
            grid: SpatialGrid::default(),
            neighbors: Vec::new(),
        }
    }

    fn infect_pool(
        &mut self,
        pool: &mut [Particle],
        params: &SimParams,
        rng: &mut SystemRng<'_>,
    ) -> usize {
        self.grid.clear();
        for (i, p) in pool.iter().enumerate() {
            if p.health == Health::Susceptible {
                self.grid.insert(i, p.x, p.y);
            }
        }

        let sources: Vec<usize> = (0..pool.len())
            .filter(|&i| pool[i].health == Health::Infected)
            .collect();

        // Two cells comfortably cover the default infection radius; widen
        // the block when a scenario configures a larger reach.
        let radius_cells =
            INFECTION_CHECK_RADIUS.max(self.grid.cells_for_distance(params.infection_radius));

        let mut new_infections = 0;
        for i in sources {
            let (sx, sy) = (pool[i].x, pool[i].y);
            self.grid
                .query_into(sx, sy, radius_cells, &mut self.neighbors);
            for &t in &self.neighbors {
                let target = &pool[t];
                // A neighbor infected earlier in this same pass is no
                // longer a valid target even though it is still bucketed.
                if target.health != Health::Susceptible {
                    continue;
                }
                let dx = sx - target.x;
                let dy = sy - target.y;
                if (dx * dx + dy * dy).sqrt() >= params.infection_radius {
                    continue;
                }
                // Certain transmission ignores the susceptibility discount:
                // a probability of one must infect every contact.
                let effective = params.prob_infection * target.susceptibility;
                if params.prob_infection >= 1.0 || rng.gen::<f64>() < effective {
                    let target = &mut pool[t];
                    target.health = Health::Infected;
                    target.days_infected = 0;
                    target.shows_symptoms = rng.gen::<f64>() >= params.prob_no_symptoms;
                    pool[i].infection_count += 1;
                    new_infections += 1;
                }
            }
        }
        new_infections
    }
}

impl Default for InfectionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for InfectionSystem {
    fn name(&self) -> &str {
        "infection"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !ctx.day_boundary {
            return Ok(());
        }
        let mut new_infections = 0;
        for zone in &mut world.zones {
            new_infections += self.infect_pool(&mut zone.particles, ctx.params, rng);
        }
        if !world.quarantine.particles.is_empty() {
            new_infections += self.infect_pool(&mut world.quarantine.particles, ctx.params, rng);
        }
        if new_infections > 0 {
            world.log(format!("{new_infections} new infection(s)"));
        }
        Ok(())
    }
}
