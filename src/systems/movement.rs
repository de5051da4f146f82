use anyhow::Result;
use rand::Rng;

use crate::{
    engine::{System, SystemContext},
    grid::SpatialGrid,
    particle::{Particle, TravelIntent},
    rng::SystemRng,
    world::{Bounds, World},
};

/// Distance from a wall at which the repulsive ramp engages.
const BOUNDARY_MARGIN: f64 = 0.15;
/// Hard clamp inset and velocity damping for soft wall collisions.
const WALL_INSET: f64 = 0.05;
const WALL_DAMPING: f64 = 0.5;
/// Constant steering speed and arrival threshold for marketplace legs.
const MARKET_SPEED: f64 = 0.08;
const MARKET_ARRIVAL: f64 = 0.05;
/// Inter-community travelers keep the velocity set at departure; arrival
/// uses a wider threshold since targets sit in open space.
const ZONE_ARRIVAL: f64 = 0.1;

/// Per-tick physics integration: boundary forces, optional social
/// distancing repulsion, random jitter, speed clamping and soft wall
/// collisions. Particles with an active travel intent bypass the force
/// model and steer toward their target instead.
pub struct MovementSystem {
    grid: SpatialGrid,
    neighbors: Vec<usize>,
}

impl MovementSystem {
    pub fn new() -> Self {
        Self {
            grid: SpatialGrid::default(),
            neighbors: Vec::new(),
        }
    }

    fn advance_pool(
        &mut self,
        ctx: &SystemContext,
        pool: &mut [Particle],
        bounds: Bounds,
        overall: Bounds,
        rng: &mut SystemRng<'_>,
    ) {
        let params = ctx.params;
        let dt = ctx.dt;

        self.grid.clear();
        for (i, p) in pool.iter().enumerate() {
            self.grid.insert(i, p.x, p.y);
        }

        for i in 0..pool.len() {
            if pool[i].is_traveling() {
                steer(&mut pool[i], overall, dt, rng);
                continue;
            }

            let (fx, fy) = {
                let p = &pool[i];
                let mut fx = 0.0;
                let mut fy = 0.0;

                let dist_left = p.x - bounds.x_min;
                let dist_right = bounds.x_max - p.x;
                let dist_bottom = p.y - bounds.y_min;
                let dist_top = bounds.y_max - p.y;
                if dist_left < BOUNDARY_MARGIN {
                    fx += params.boundary_force * (1.0 - dist_left / BOUNDARY_MARGIN);
                }
                if dist_right < BOUNDARY_MARGIN {
                    fx -= params.boundary_force * (1.0 - dist_right / BOUNDARY_MARGIN);
                }
                if dist_bottom < BOUNDARY_MARGIN {
                    fy += params.boundary_force * (1.0 - dist_bottom / BOUNDARY_MARGIN);
                }
                if dist_top < BOUNDARY_MARGIN {
                    fy -= params.boundary_force * (1.0 - dist_top / BOUNDARY_MARGIN);
                }

                if params.social_distance_factor > 0.0 && p.obeys_social_distance {
                    let sd_radius = params.infection_radius * params.boxes_to_consider as f64;
                    self.grid
                        .query_into(p.x, p.y, params.boxes_to_consider, &mut self.neighbors);
                    for &j in &self.neighbors {
                        if j == i {
                            continue;
                        }
                        let other = &pool[j];
                        let dist = p.distance_to(other);
                        if dist > 0.001 && dist < sd_radius {
                            let force = params.social_distance_factor / (dist * dist + 0.01);
                            fx += force * (p.x - other.x) / (dist + 0.001) / 50.0;
                            fy += force * (p.y - other.y) / (dist + 0.001) / 50.0;
                        }
                    }
                }
                (fx, fy)
            };

            let p = &mut pool[i];
            p.ax = rng.gen_range(-0.002..0.002);
            p.ay = rng.gen_range(-0.002..0.002);
            p.vx += (p.ax + fx) * dt;
            p.vy += (p.ay + fy) * dt;

            let max_speed = if params.social_distance_factor > 0.3 {
                0.05
            } else {
                params.speed_limit
            };
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            if speed > max_speed {
                p.vx *= max_speed / speed;
                p.vy *= max_speed / speed;
            }

            p.x += p.vx * dt;
            p.y += p.vy * dt;
            clamp_soft(p, bounds);
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let overall = world.bounds;
        for zi in 0..world.zones.len() {
            let bounds = world.zones[zi].bounds;
            self.advance_pool(ctx, &mut world.zones[zi].particles, bounds, overall, rng);
        }
        let pocket = world.quarantine.bounds;
        self.advance_pool(ctx, &mut world.quarantine.particles, pocket, overall, rng);
        Ok(())
    }
}

/// Constant-speed steering toward the active travel target. Marketplace
/// legs re-aim every tick; inter-community travelers fly with the velocity
/// set at departure.
fn steer(p: &mut Particle, overall: Bounds, dt: f64, rng: &mut impl Rng) {
    match p.intent {
        TravelIntent::ToMarket { x, y } => {
            let (dx, dy) = (x - p.x, y - p.y);
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < MARKET_ARRIVAL {
                p.intent = TravelIntent::AtMarket;
                p.vx = rng.gen_range(-0.02..0.02);
                p.vy = rng.gen_range(-0.02..0.02);
                return;
            }
            p.vx = dx / dist * MARKET_SPEED;
            p.vy = dy / dist * MARKET_SPEED;
        }
        TravelIntent::ReturningHome { x, y } => {
            let (dx, dy) = (x - p.x, y - p.y);
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < MARKET_ARRIVAL {
                p.intent = TravelIntent::None;
                p.vx = rng.gen_range(-0.02..0.02);
                p.vy = rng.gen_range(-0.02..0.02);
                return;
            }
            p.vx = dx / dist * MARKET_SPEED;
            p.vy = dy / dist * MARKET_SPEED;
        }
        _ => {}
    }

    p.x += p.vx * dt;
    p.y += p.vy * dt;
    clamp_soft(p, overall);

    if let TravelIntent::ToZone { x, y, .. } = p.intent {
        let (dx, dy) = (x - p.x, y - p.y);
        if (dx * dx + dy * dy).sqrt() < ZONE_ARRIVAL {
            p.intent = TravelIntent::None;
            p.vx = rng.gen_range(-0.2..0.2);
            p.vy = rng.gen_range(-0.2..0.2);
        }
    }
}

fn clamp_soft(p: &mut Particle, bounds: Bounds) {
    if p.x < bounds.x_min + WALL_INSET {
        p.x = bounds.x_min + WALL_INSET;
        p.vx = p.vx.abs() * WALL_DAMPING;
    } else if p.x > bounds.x_max - WALL_INSET {
        p.x = bounds.x_max - WALL_INSET;
        p.vx = -p.vx.abs() * WALL_DAMPING;
    }
    if p.y < bounds.y_min + WALL_INSET {
        p.y = bounds.y_min + WALL_INSET;
        p.vy = p.vy.abs() * WALL_DAMPING;
    } else if p.y > bounds.y_max - WALL_INSET {
        p.y = bounds.y_max - WALL_INSET;
        p.vy = -p.vy.abs() * WALL_DAMPING;
    }
}
