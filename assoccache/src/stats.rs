use serde::{Deserialize, Serialize};

/// Hit and miss counters, reset only when the whole simulator is re-initialised
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct StatsTracker {
    hits: u64,
    misses: u64,
}

impl StatsTracker {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses which missed, or 0 if nothing has been accessed yet
    pub fn miss_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            total => self.misses as f64 / total as f64,
        }
    }
}

/// The result of a simulation. Can be serialised for the `--json` report
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub hits: u64,
    pub misses: u64,
    pub miss_rate: f64,
}

impl From<&StatsTracker> for SimulationResult {
    fn from(value: &StatsTracker) -> Self {
        Self {
            hits: value.hits,
            misses: value.misses,
            miss_rate: value.miss_rate(),
        }
    }
}
