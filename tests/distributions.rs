use outbreak::params::SimParams;
use outbreak::particle::{Health, Particle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SAMPLES: usize = 10_000;

fn sample_particles(seed: u64) -> Vec<Particle> {
    let params = SimParams::default();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..SAMPLES)
        .map(|_| Particle::new(0.0, 0.0, Health::Susceptible, &params, &mut rng))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64).sqrt()
}

#[test]
fn susceptibility_follows_the_configured_normal() {
    let particles = sample_particles(101);
    let draws: Vec<f64> = particles.iter().map(|p| p.susceptibility).collect();

    let m = mean(&draws);
    let sd = std_dev(&draws);
    assert!((0.95..=1.05).contains(&m), "sample mean {m} out of range");
    assert!((0.15..=0.25).contains(&sd), "sample std {sd} out of range");

    let min = draws.iter().cloned().fold(f64::INFINITY, f64::min);
    assert!(min >= 0.1, "susceptibility floor violated: {min}");
}

#[test]
fn recovery_modifier_stays_clamped_with_mean_near_one() {
    let particles = sample_particles(202);
    let draws: Vec<f64> = particles.iter().map(|p| p.recovery_modifier).collect();

    for &v in &draws {
        assert!((0.5..=3.0).contains(&v), "modifier {v} escaped the clamp");
    }
    // The exponential's mean is 1.0; clamping both tails skews the sample
    // mean slightly upward.
    let m = mean(&draws);
    assert!((0.9..=1.2).contains(&m), "sample mean {m} out of range");
}

#[test]
fn modifiers_vary_between_particles() {
    let particles = sample_particles(303);
    let first = particles[0].susceptibility;
    assert!(particles.iter().any(|p| p.susceptibility != first));
    let first = particles[0].recovery_modifier;
    assert!(particles.iter().any(|p| p.recovery_modifier != first));
}
