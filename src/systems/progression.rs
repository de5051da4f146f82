use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    particle::{Health, Particle, TravelIntent},
    rng::SystemRng,
    world::World,
};

enum Departure {
    Died,
    Quarantine,
}

/// Daily illness bookkeeping: advance infection timers, resolve recovery
/// versus death once the per-particle duration elapses, and collect
/// symptomatic particles for the quarantine pen. Departures are applied
/// after each pool's pass by swap-removing from the highest index down, so
/// a particle never sits in two pools and dead particles are retained
/// nowhere.
pub struct ProgressionSystem;

impl ProgressionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ProgressionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ProgressionSystem {
    fn name(&self) -> &str {
        "progression"
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

        let mut recovered_total = 0;
        let mut died_total = 0;
        let mut quarantined_total = 0;

        for zi in 0..world.zones.len() {
            let (recovered, departures) =
                progress_pool(&mut world.zones[zi].particles, ctx, rng);
            recovered_total += recovered;
            for (idx, departure) in departures {
                let mut p = world.zones[zi].particles.swap_remove(idx);
                match departure {
                    Departure::Died => died_total += 1,
                    Departure::Quarantine => {
                        p.quarantined = true;
                        p.obeys_social_distance = false;
                        p.intent = TravelIntent::None;
                        let (x, y) = world.quarantine.bounds.random_point(0.0, rng);
                        p.x = x;
                        p.y = y;
                        p.vx = rng.gen_range(-0.05..0.05);
                        p.vy = rng.gen_range(-0.05..0.05);
                        world.quarantine.particles.push(p);
                        quarantined_total += 1;
                    }
                }
            }
        }

        // Pen residents are already flagged, so only deaths depart here.
        let (recovered, departures) = progress_pool(&mut world.quarantine.particles, ctx, rng);
        recovered_total += recovered;
        for (idx, _) in departures {
            world.quarantine.particles.swap_remove(idx);
            died_total += 1;
        }

        if recovered_total > 0 {
            world.log(format!("{recovered_total} recovered"));
        }
        if died_total > 0 {
            world.log(format!(
                "{died_total} died (mortality {:.1}%)",
                ctx.params.mortality_rate * 100.0
            ));
        }
        if quarantined_total > 0 {
            world.log(format!("{quarantined_total} moved to quarantine"));
        }
        Ok(())
    }
}

/// One pool's daily pass. Returns the recovery count and the departures in
/// descending index order, ready for swap-removal.
fn progress_pool(
    pool: &mut [Particle],
    ctx: &SystemContext,
    rng: &mut SystemRng<'_>,
) -> (usize, Vec<(usize, Departure)>) {
    let params = ctx.params;
    let mut recovered = 0;
    let mut departures = Vec::new();

    for (i, p) in pool.iter_mut().enumerate() {
        if p.health != Health::Infected {
            continue;
        }
        p.days_infected += 1;

        let effective_duration = f64::from(params.infection_duration) * p.recovery_modifier;
        if f64::from(p.days_infected) >= effective_duration {
            if rng.gen::<f64>() < params.mortality_rate {
                departures.push((i, Departure::Died));
            } else {
                p.health = Health::Removed;
                recovered += 1;
            }
        } else if params.quarantine_enabled
            && p.days_infected >= params.quarantine_after
            && ctx.day >= params.start_quarantine
            && p.shows_symptoms
            && !p.quarantined
        {
            departures.push((i, Departure::Quarantine));
        }
    }

    departures.reverse();
    (recovered, departures)
}
