use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::params::{Mode, SimParams};
use crate::particle::{Health, Particle};
use crate::stats::{DailyCounts, Event, StatsHistory};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Bounds {
    pub const fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    pub fn random_point(&self, inset: f64, rng: &mut impl Rng) -> (f64, f64) {
        (
            rng.gen_range(self.x_min + inset..self.x_max - inset),
            rng.gen_range(self.y_min + inset..self.y_max - inset),
        )
    }
}

pub const SIMPLE_BOUNDS: Bounds = Bounds::new(-1.0, 1.0, -1.0, 1.0);
pub const COMMUNITY_COUNT: usize = 9;

/// Tile `3i + j` of the fixed 3x3 community layout.
pub fn community_bounds(id: usize) -> Bounds {
    let i = (id / 3) as f64;
    let j = (id % 3) as f64;
    Bounds::new(
        -3.0 + i * 2.2,
        -1.0 + i * 2.2,
        -3.0 + j * 2.2,
        -1.0 + j * 2.2,
    )
}

/// Where quarantined particles are penned: a corner pocket of the single
/// space, or the reserved lower-left tile of the community grid.
pub fn quarantine_pocket(mode: Mode) -> Bounds {
    match mode {
        Mode::Simple => Bounds::new(-0.95, -0.6, -0.95, -0.6),
        Mode::Communities => Bounds::new(-2.9, -1.1, -2.9, -1.1),
    }
}

fn overall_bounds(mode: Mode) -> Bounds {
    match mode {
        Mode::Simple => SIMPLE_BOUNDS,
        Mode::Communities => Bounds::new(-3.0, 3.4, -3.0, 3.4),
    }
}

pub struct Zone {
    pub bounds: Bounds,
    pub particles: Vec<Particle>,
}

impl Zone {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            particles: Vec::new(),
        }
    }
}

/// All mutable simulation state: the zone pools, the quarantine pool, the
/// clock, and the day-indexed statistics. Every particle lives in exactly
/// one pool; transfers move the value.
pub struct World {
    pub mode: Mode,
    /// Union of every zone; traveling particles clamp against this so they
    /// can cross zone borders.
    pub bounds: Bounds,
    pub zones: Vec<Zone>,
    pub quarantine: Zone,

    pub time_count: u64,
    pub day_count: u32,
    pub last_marketplace_day: i64,
    pub initial_population: usize,
    pub stats: StatsHistory,

    events: Vec<Event>,
}

impl World {
    pub fn empty(mode: Mode) -> Self {
        let zones = match mode {
            Mode::Simple => vec![Zone::new(SIMPLE_BOUNDS)],
            Mode::Communities => (0..COMMUNITY_COUNT)
                .map(|id| Zone::new(community_bounds(id)))
                .collect(),
        };
        Self {
            mode,
            bounds: overall_bounds(mode),
            zones,
            quarantine: Zone::new(quarantine_pocket(mode)),
            time_count: 0,
            day_count: 0,
            last_marketplace_day: 0,
            initial_population: 0,
            stats: StatsHistory::default(),
            events: Vec::new(),
        }
    }

    /// Build a fresh, fully populated world. There is no incremental
    /// reconfiguration: callers that change the population layout discard
    /// the old world and seed a new one.
    pub fn seeded(mode: Mode, params: &SimParams, rng: &mut impl Rng) -> Self {
        let mut world = World::empty(mode);
        world.last_marketplace_day = -i64::from(params.marketplace_interval);
        match mode {
            Mode::Simple => world.seed_simple(params, rng),
            Mode::Communities => world.seed_communities(params, rng),
        }
        world
    }

    fn seed_simple(&mut self, params: &SimParams, rng: &mut impl Rng) {
        let total = params.num_particles;
        let infected = seed_count(total, params.fraction_infected_init);
        self.log(format!("spawning {total} particles ({infected} infected)"));

        let zone = &mut self.zones[0];
        for k in 0..total {
            let (x, y) = zone.bounds.random_point(0.15, rng);
            let health = if k < infected {
                Health::Infected
            } else {
                Health::Susceptible
            };
            zone.particles.push(Particle::new(x, y, health, params, rng));
        }
        self.initial_population = total;
        if infected > 0 {
            self.log(format!("patient zero seeded: {infected} initial infection(s)"));
        }
    }

    fn seed_communities(&mut self, params: &SimParams, rng: &mut impl Rng) {
        let to_infect = params.communities_to_infect.clamp(1, COMMUNITY_COUNT);
        let infected_zones: Vec<usize> = sample(rng, COMMUNITY_COUNT, to_infect).into_vec();
        self.log(format!(
            "creating {COMMUNITY_COUNT} communities (infecting {infected_zones:?})"
        ));

        let mut total_infected = 0;
        let mut populated_zones = 0;
        for id in 0..COMMUNITY_COUNT {
            // The lower-left tile stays empty when it doubles as the
            // quarantine pen.
            if params.quarantine_enabled && id == 0 {
                continue;
            }
            populated_zones += 1;
            let infected = if infected_zones.contains(&id) {
                seed_count(params.num_per_community, params.fraction_infected_init)
            } else {
                0
            };
            total_infected += infected;

            let zone = &mut self.zones[id];
            for k in 0..params.num_per_community {
                let (x, y) = zone.bounds.random_point(0.1, rng);
                let health = if k < infected {
                    Health::Infected
                } else {
                    Health::Susceptible
                };
                zone.particles.push(Particle::new(x, y, health, params, rng));
            }
        }

        self.initial_population = params.num_per_community * populated_zones;
        self.log(format!(
            "total: {} particles ({} infected across {} communities)",
            self.initial_population, total_infected, to_infect
        ));
        if params.quarantine_enabled {
            self.log("lower-left tile reserved for quarantine");
        }
    }

    pub fn total_population(&self) -> usize {
        self.zones
            .iter()
            .map(|zone| zone.particles.len())
            .sum::<usize>()
            + self.quarantine.particles.len()
    }

    pub fn all_particles(&self) -> impl Iterator<Item = &Particle> {
        self.zones
            .iter()
            .flat_map(|zone| zone.particles.iter())
            .chain(self.quarantine.particles.iter())
    }

    /// Census across every pool including quarantine. Dead particles exist
    /// nowhere, so the death count is the shortfall against the initial
    /// population.
    pub fn counts(&self) -> DailyCounts {
        let mut counts = DailyCounts::default();
        for particle in self.all_particles() {
            match particle.health {
                Health::Susceptible => counts.susceptible += 1,
                Health::Infected => counts.infected += 1,
                Health::Removed => counts.removed += 1,
            }
        }
        counts.dead = self.initial_population.saturating_sub(counts.alive());
        counts
    }

    pub fn advance_time(&mut self, day_boundary: bool) {
        self.time_count += 1;
        if day_boundary {
            self.day_count += 1;
        }
    }

    /// Queue a day-prefixed log line for the observation callbacks.
    pub fn log(&mut self, message: impl AsRef<str>) {
        self.events.push(Event::Log(format!(
            "[day {:03}] {}",
            self.day_count,
            message.as_ref()
        )));
    }

    pub(crate) fn push_stats(&mut self, counts: DailyCounts) {
        self.events.push(Event::Stats(counts));
    }

    pub(crate) fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

fn seed_count(population: usize, fraction: f64) -> usize {
    if fraction > 0.0 {
        ((population as f64 * fraction) as usize).max(1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn seed_count_rounds_up_to_one() {
        assert_eq!(seed_count(100, 0.01), 1);
        assert_eq!(seed_count(10, 0.001), 1);
        assert_eq!(seed_count(100, 0.05), 5);
        assert_eq!(seed_count(100, 0.0), 0);
    }

    #[test]
    fn simple_world_spawns_inside_bounds() {
        let params = SimParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let world = World::seeded(Mode::Simple, &params, &mut rng);
        assert_eq!(world.total_population(), params.num_particles);
        assert_eq!(world.initial_population, params.num_particles);
        for p in world.all_particles() {
            assert!(p.x > -1.0 && p.x < 1.0);
            assert!(p.y > -1.0 && p.y < 1.0);
        }
    }

    #[test]
    fn quarantine_reserves_the_lower_left_tile() {
        let params = SimParams {
            quarantine_enabled: true,
            ..SimParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let world = World::seeded(Mode::Communities, &params, &mut rng);
        assert!(world.zones[0].particles.is_empty());
        assert_eq!(world.initial_population, params.num_per_community * 8);

        let open = SimParams::default();
        let world = World::seeded(Mode::Communities, &open, &mut rng);
        assert_eq!(world.initial_population, open.num_per_community * 9);
        assert!(!world.zones[0].particles.is_empty());
    }

    #[test]
    fn community_layout_is_a_3x3_grid() {
        let b0 = community_bounds(0);
        assert_eq!((b0.x_min, b0.x_max), (-3.0, -1.0));
        let b8 = community_bounds(8);
        assert!((b8.x_min - 1.4).abs() < 1e-9);
        assert!((b8.x_max - 3.4).abs() < 1e-9);
        // tiles don't overlap: each spans 2.0 with a 0.2 gap
        let b1 = community_bounds(1);
        assert!((b1.y_min - (-0.8)).abs() < 1e-9);
    }
}
