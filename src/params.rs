use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the population is laid out: one shared space, or a 3x3 grid of
/// communities with inter-community travel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Simple,
    Communities,
}

/// Flat parameter bundle read fresh by the engine on every tick and day
/// pass. Callers may mutate fields between steps; changing the population
/// size only takes effect on the next `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub infection_radius: f64,
    pub prob_infection: f64,
    pub fraction_infected_init: f64,
    pub infection_duration: u32,
    pub mortality_rate: f64,
    pub prob_no_symptoms: f64,

    pub social_distance_factor: f64,
    pub social_distance_obedient: f64,
    pub boxes_to_consider: i32,

    pub num_particles: usize,
    pub speed_limit: f64,
    pub boundary_force: f64,
    pub time_steps_per_day: u32,

    pub quarantine_enabled: bool,
    pub quarantine_after: u32,
    pub start_quarantine: u32,

    pub travel_probability: f64,
    pub num_per_community: usize,
    pub communities_to_infect: usize,

    pub marketplace_enabled: bool,
    pub marketplace_interval: u32,
    pub marketplace_duration: u32,
    pub marketplace_attendance: f64,
    pub marketplace_x: f64,
    pub marketplace_y: f64,
    pub marketplace_community: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            infection_radius: 0.15,
            prob_infection: 0.15,
            fraction_infected_init: 0.01,
            infection_duration: 25,
            mortality_rate: 0.0,
            prob_no_symptoms: 0.2,

            social_distance_factor: 0.0,
            social_distance_obedient: 1.0,
            boxes_to_consider: 2,

            num_particles: 200,
            speed_limit: 0.1,
            boundary_force: 0.2,
            time_steps_per_day: 24,

            quarantine_enabled: false,
            quarantine_after: 5,
            start_quarantine: 10,

            travel_probability: 0.02,
            num_per_community: 60,
            communities_to_infect: 2,

            marketplace_enabled: false,
            marketplace_interval: 7,
            marketplace_duration: 2,
            marketplace_attendance: 0.6,
            marketplace_x: 0.0,
            marketplace_y: 0.0,
            marketplace_community: 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("{field} must lie within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{0}")]
    Invalid(String),
}

impl SimParams {
    /// Range checks applied when a scenario is loaded. The engine itself
    /// assumes parameters have already been through this gate.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let probabilities = [
            ("prob_infection", self.prob_infection),
            ("fraction_infected_init", self.fraction_infected_init),
            ("mortality_rate", self.mortality_rate),
            ("prob_no_symptoms", self.prob_no_symptoms),
            ("social_distance_obedient", self.social_distance_obedient),
            ("travel_probability", self.travel_probability),
            ("marketplace_attendance", self.marketplace_attendance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParamsError::OutOfRange {
                    field,
                    min: 0.0,
                    max: 1.0,
                    value,
                });
            }
        }
        if self.infection_radius <= 0.0 {
            return Err(ParamsError::Invalid(
                "infection_radius must be positive".into(),
            ));
        }
        if self.speed_limit <= 0.0 {
            return Err(ParamsError::Invalid("speed_limit must be positive".into()));
        }
        if self.boundary_force < 0.0 {
            return Err(ParamsError::Invalid(
                "boundary_force must not be negative".into(),
            ));
        }
        if self.social_distance_factor < 0.0 {
            return Err(ParamsError::Invalid(
                "social_distance_factor must not be negative".into(),
            ));
        }
        if self.time_steps_per_day == 0 {
            return Err(ParamsError::Invalid(
                "time_steps_per_day must be at least 1".into(),
            ));
        }
        if self.infection_duration == 0 {
            return Err(ParamsError::Invalid(
                "infection_duration must be at least 1".into(),
            ));
        }
        if self.boxes_to_consider < 0 {
            return Err(ParamsError::Invalid(
                "boxes_to_consider must not be negative".into(),
            ));
        }
        if self.marketplace_community > 8 {
            return Err(ParamsError::Invalid(
                "marketplace_community must name one of the nine tiles (0..=8)".into(),
            ));
        }
        Ok(())
    }
}

/// A named, seeded parameter set. Scenario files are the on-disk preset
/// catalog; everything the engine needs at runtime lives in `params`.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    #[serde(default)]
    pub params: SimParams,
}

fn default_snapshot_interval_ticks() -> u64 {
    0
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(text).context("failed to parse scenario")?;
        scenario
            .params
            .validate()
            .with_context(|| format!("scenario '{}' rejected", scenario.name))?;
        Ok(scenario)
    }

    pub fn days(&self, override_days: Option<u32>) -> u32 {
        override_days.or(self.days).unwrap_or(60)
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        Scenario::from_yaml(&data).with_context(|| format!("failed to load {}", path.display()))
    }
}
