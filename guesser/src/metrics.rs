// src/metrics.rs
//
// Online metrics for target-probability trajectories.
// - OnlineStats: Welford running mean/variance + min/max across runs.
// - DrawdownTracker: running peak and largest drop of a trajectory.
// - ConvergenceStats: per-trajectory convergence speed / stability summary.

use serde::{Deserialize, Serialize};

/// Default probability a trajectory must reach to count as converged.
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
pub struct OnlineStats {
    n: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for OnlineStats {
    fn default() -> Self {
        Self {
            n: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl OnlineStats {
    /// Adds a sample if finite. Non-finite samples are ignored.
    pub fn add(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }

        self.n += 1;
        self.min = self.min.min(x);
        self.max = self.max.max(x);

        let delta = x - self.mean;
        self.mean += delta / (self.n as f64);
        self.m2 += delta * (x - self.mean);
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn min(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.max
        }
    }

    /// Population variance (divide by n).
    pub fn variance_population(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.m2 / (self.n as f64)
        }
    }

    pub fn stddev_population(&self) -> f64 {
        self.variance_population().sqrt()
    }
}

impl FromIterator<f64> for OnlineStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = OnlineStats::default();
        for x in iter {
            stats.add(x);
        }
        stats
    }
}

/// Tracks the running peak of a probability trajectory and the largest
/// fall below it. Under a pure reinforcement rubric this stays near zero;
/// noisy shaping shows up as drawdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawdownTracker {
    peak: f64,
    max_drawdown: f64,
    initialised: bool,
}

impl DrawdownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if !self.initialised {
            self.peak = value;
            self.max_drawdown = 0.0;
            self.initialised = true;
            return;
        }
        if value > self.peak {
            self.peak = value;
        } else {
            self.max_drawdown = self.max_drawdown.max(self.peak - value);
        }
    }

    pub fn peak(&self) -> f64 {
        if self.initialised {
            self.peak
        } else {
            0.0
        }
    }

    pub fn max_drawdown(&self) -> f64 {
        if self.initialised {
            self.max_drawdown
        } else {
            0.0
        }
    }
}

/// Summary of one target-probability trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceStats {
    pub initial: f64,
    #[serde(rename = "final")]
    pub final_prob: f64,
    pub peak: f64,
    /// Threshold used for `iterations_to_threshold`.
    pub threshold: f64,
    /// First iteration at which the probability reached `threshold`
    /// (0 = already there at initialisation).
    pub iterations_to_threshold: Option<usize>,
    /// Largest drop below a previous peak.
    pub max_drawdown: f64,
}

impl ConvergenceStats {
    /// `probs[0]` is the initial probability, `probs[i]` the value after
    /// iteration `i`. An empty trajectory gives all zeros.
    pub fn from_trajectory(probs: &[f64], threshold: f64) -> Self {
        let mut dd = DrawdownTracker::new();
        for &p in probs {
            dd.update(p);
        }
        Self {
            initial: probs.first().copied().unwrap_or(0.0),
            final_prob: probs.last().copied().unwrap_or(0.0),
            peak: dd.peak(),
            threshold,
            iterations_to_threshold: probs.iter().position(|&p| p >= threshold),
            max_drawdown: dd.max_drawdown(),
        }
    }

    pub fn converged(&self) -> bool {
        self.iterations_to_threshold.is_some()
    }
}
