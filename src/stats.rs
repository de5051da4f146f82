use serde::{Deserialize, Serialize};

/// Per-day population census across every pool. `dead` is derived: the
/// shortfall against the initial population, since dead particles are not
/// retained anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub removed: usize,
    pub dead: usize,
}

impl DailyCounts {
    pub fn alive(&self) -> usize {
        self.susceptible + self.infected + self.removed
    }
}

/// Day-indexed percentage history for trend display. Percentages are
/// relative to the initial population, so the columns stop summing to 100
/// once deaths occur.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    pub day: Vec<u32>,
    pub susceptible: Vec<f64>,
    pub infected: Vec<f64>,
    pub removed: Vec<f64>,
    pub dead: Vec<f64>,
}

impl StatsHistory {
    pub fn record(&mut self, day: u32, counts: &DailyCounts, initial_population: usize) {
        if initial_population == 0 {
            return;
        }
        let pct = |n: usize| n as f64 / initial_population as f64 * 100.0;
        self.day.push(day);
        self.susceptible.push(pct(counts.susceptible));
        self.infected.push(pct(counts.infected));
        self.removed.push(pct(counts.removed));
        self.dead.push(pct(counts.dead));
    }

    pub fn len(&self) -> usize {
        self.day.len()
    }

    pub fn is_empty(&self) -> bool {
        self.day.is_empty()
    }
}

/// Engine-to-caller notification. Queued on the world during a tick and
/// drained by the engine, which forwards them to the registered callbacks
/// and returns them in the tick summary.
#[derive(Debug, Clone)]
pub enum Event {
    Stats(DailyCounts),
    Log(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_track_initial_population() {
        let mut history = StatsHistory::default();
        let counts = DailyCounts {
            susceptible: 50,
            infected: 25,
            removed: 15,
            dead: 10,
        };
        history.record(3, &counts, 100);
        assert_eq!(history.len(), 1);
        assert_eq!(history.day[0], 3);
        assert_eq!(history.susceptible[0], 50.0);
        assert_eq!(history.dead[0], 10.0);
    }

    #[test]
    fn empty_population_records_nothing() {
        let mut history = StatsHistory::default();
        history.record(0, &DailyCounts::default(), 0);
        assert!(history.is_empty());
    }
}
