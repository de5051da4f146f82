use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    params::Mode,
    particle::{Particle, TravelIntent},
    rng::SystemRng,
    world::World,
};

/// Outer per-day probability that any travel happens at all.
const DAILY_TRAVEL_GATE: f64 = 0.3;
const TRAVEL_SPEED: f64 = 0.15;

/// Daily inter-community travel. A selected particle changes owner at
/// selection time: it is swap-removed from its origin zone and pushed onto
/// the destination immediately, while its visual position catches up over
/// the following ticks under the steering in the movement pass.
pub struct TravelSystem;

impl TravelSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TravelSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for TravelSystem {
    fn name(&self) -> &str {
        "travel"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if !ctx.day_boundary || ctx.mode != Mode::Communities {
            return Ok(());
        }
        if rng.gen::<f64>() >= DAILY_TRAVEL_GATE {
            return Ok(());
        }

        let per_particle =
            ctx.params.travel_probability / f64::from(ctx.params.time_steps_per_day.max(1));
        let zone_count = world.zones.len();
        let mut moves: Vec<(usize, Particle)> = Vec::new();

        for zi in 0..zone_count {
            let mut selected = Vec::new();
            for (i, p) in world.zones[zi].particles.iter().enumerate() {
                if !p.quarantined && !p.is_traveling() && rng.gen::<f64>() < per_particle {
                    selected.push(i);
                }
            }

            for &i in selected.iter().rev() {
                let mut p = world.zones[zi].particles.swap_remove(i);
                let mut dest = rng.gen_range(0..zone_count - 1);
                if dest >= zi {
                    dest += 1;
                }
                let (tx, ty) = world.zones[dest].bounds.random_point(0.1, rng);
                p.intent = TravelIntent::ToZone {
                    zone: dest,
                    x: tx,
                    y: ty,
                };
                let (dx, dy) = (tx - p.x, ty - p.y);
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > 0.0 {
                    p.vx = dx / dist * TRAVEL_SPEED;
                    p.vy = dy / dist * TRAVEL_SPEED;
                }
                moves.push((dest, p));
            }
        }

        let travelers = moves.len();
        for (dest, p) in moves {
            world.zones[dest].particles.push(p);
        }
        if travelers > 0 {
            world.log(format!("{travelers} traveled between communities"));
        }
        Ok(())
    }
}
