use rand::Rng;
use rand_distr::{Distribution, Exp, Normal};

use crate::params::SimParams;

/// Epidemiological state of a single particle. Death has no variant: dead
/// particles are removed from their pool and only show up as the shortfall
/// against the initial population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Susceptible,
    Infected,
    Removed,
}

/// Exclusive movement override. While an intent is active, force-based
/// physics is suspended and the particle steers toward its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TravelIntent {
    None,
    ToMarket { x: f64, y: f64 },
    AtMarket,
    ReturningHome { x: f64, y: f64 },
    ToZone { zone: usize, x: f64, y: f64 },
}

/// One person. Owned by exactly one zone collection (or the quarantine
/// pool); moves between pools by value, never by copy.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,

    pub health: Health,
    pub days_infected: u32,
    pub infection_count: u32,

    /// Multiplier on the infection probability, drawn once per lifetime
    /// from Normal(1.0, 0.2) and floored at 0.1.
    pub susceptibility: f64,
    /// Multiplier on the infection duration, drawn once per lifetime from
    /// Exp(mean 1.0) and clamped to [0.5, 3.0].
    pub recovery_modifier: f64,

    pub quarantined: bool,
    pub shows_symptoms: bool,
    pub obeys_social_distance: bool,

    pub intent: TravelIntent,
    pub home_x: f64,
    pub home_y: f64,
    pub market_timer: u32,
}

impl Particle {
    pub fn new(x: f64, y: f64, health: Health, params: &SimParams, rng: &mut impl Rng) -> Self {
        let susceptibility_dist =
            Normal::<f64>::new(1.0, 0.2).expect("susceptibility distribution parameters are valid");
        let recovery_dist = Exp::<f64>::new(1.0).expect("recovery distribution parameter is valid");

        let mut shows_symptoms = true;
        if health == Health::Infected && rng.gen::<f64>() < params.prob_no_symptoms {
            shows_symptoms = false;
        }

        Self {
            x,
            y,
            vx: rng.gen_range(-0.2..0.2),
            vy: rng.gen_range(-0.2..0.2),
            ax: 0.0,
            ay: 0.0,
            health,
            days_infected: 0,
            infection_count: 0,
            susceptibility: susceptibility_dist.sample(rng).max(0.1),
            recovery_modifier: recovery_dist.sample(rng).clamp(0.5, 3.0),
            quarantined: false,
            shows_symptoms,
            obeys_social_distance: rng.gen::<f64>() < params.social_distance_obedient,
            intent: TravelIntent::None,
            home_x: x,
            home_y: y,
            market_timer: 0,
        }
    }

    pub fn distance_to(&self, other: &Particle) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// True while the particle is steering toward a target instead of
    /// following force-based physics. Standing at the marketplace does not
    /// count; those particles mill around under normal physics.
    pub fn is_traveling(&self) -> bool {
        matches!(
            self.intent,
            TravelIntent::ToMarket { .. }
                | TravelIntent::ReturningHome { .. }
                | TravelIntent::ToZone { .. }
        )
    }

    pub fn has_market_intent(&self) -> bool {
        matches!(
            self.intent,
            TravelIntent::ToMarket { .. } | TravelIntent::AtMarket | TravelIntent::ReturningHome { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn fresh_particle_is_settled() {
        let params = SimParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let p = Particle::new(0.3, -0.2, Health::Susceptible, &params, &mut rng);
        assert_eq!(p.health, Health::Susceptible);
        assert_eq!(p.intent, TravelIntent::None);
        assert!(!p.is_traveling());
        assert!(!p.quarantined);
        assert_eq!((p.home_x, p.home_y), (0.3, -0.2));
        assert!(p.vx.abs() < 0.2 && p.vy.abs() < 0.2);
    }

    #[test]
    fn distance_is_euclidean() {
        let params = SimParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let a = Particle::new(0.0, 0.0, Health::Susceptible, &params, &mut rng);
        let b = Particle::new(3.0, 4.0, Health::Susceptible, &params, &mut rng);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn infected_seed_can_be_asymptomatic() {
        let params = SimParams {
            prob_no_symptoms: 1.0,
            ..SimParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let p = Particle::new(0.0, 0.0, Health::Infected, &params, &mut rng);
        assert!(!p.shows_symptoms);

        let symptomatic = SimParams {
            prob_no_symptoms: 0.0,
            ..SimParams::default()
        };
        let p = Particle::new(0.0, 0.0, Health::Infected, &symptomatic, &mut rng);
        assert!(p.shows_symptoms);
    }
}
