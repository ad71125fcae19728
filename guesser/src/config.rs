// src/config.rs
//
// Experiment configuration: the parameters a driver hands to one run.
//
// Defaults are the small demo run (action space 0..=10, target 6,
// batch 10, 16 iterations, binary rubric). Environment overrides exist for
// batch / research runs:
//
//   - GUESSER_SEED          (u64)
//   - GUESSER_BATCH_SIZE    (usize, >= 1)
//   - GUESSER_ITERATIONS    (usize)
//   - GUESSER_DECAY_FACTOR  (f64, > 0; exponential rubric only)
//
// Any variable that fails to parse is ignored with a warning.

use std::env;

use serde::{Deserialize, Serialize};

use crate::action_space::ActionSpace;
use crate::error::{GuesserError, GuesserResult};
use crate::rubric::{validate_decay_factor, RubricSpec};

pub const DEFAULT_MIN: i64 = 0;
pub const DEFAULT_MAX: i64 = 10;
pub const DEFAULT_TARGET: i64 = 6;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_ITERATIONS: usize = 16;
pub const DEFAULT_SEED: u64 = 1;

/// Parameters for a single experiment run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Smallest guessable action (inclusive).
    pub min: i64,
    /// Largest guessable action (inclusive).
    pub max: i64,
    /// Hidden target action; must lie in [min, max].
    pub target: i64,
    /// Guesses sampled per iteration.
    pub batch_size: usize,
    /// Number of sample -> evaluate -> update iterations.
    pub iterations: usize,
    /// Reward-shaping strategy.
    #[serde(default)]
    pub rubric: RubricSpec,
    /// Seed for the run's ChaCha8 RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            target: DEFAULT_TARGET,
            batch_size: DEFAULT_BATCH_SIZE,
            iterations: DEFAULT_ITERATIONS,
            rubric: RubricSpec::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl ExperimentConfig {
    pub fn action_space(&self) -> GuesserResult<ActionSpace> {
        ActionSpace::new(self.min, self.max)
    }

    /// Reject configurations that could only fail mid-loop.
    pub fn validate(&self) -> GuesserResult<()> {
        let space = self.action_space()?;
        if !space.contains(self.target) {
            return Err(GuesserError::config(
                "target",
                format!(
                    "target {} must lie in the action space [{}, {}]",
                    self.target, self.min, self.max
                ),
            ));
        }
        if self.batch_size == 0 {
            return Err(GuesserError::config("batch_size", "must be >= 1"));
        }
        self.rubric.validate()?;
        // Surfaces rubric-specific construction errors (degenerate linear).
        self.rubric.build(self.target, self.min, self.max)?;
        Ok(())
    }

    // Builder helpers, handy for sweeps and tests.

    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_target(mut self, target: i64) -> Self {
        self.target = target;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_rubric(mut self, rubric: RubricSpec) -> Self {
        self.rubric = rubric;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Defaults, then environment overrides.
    pub fn from_env() -> Self {
        Self::default().apply_env_overrides()
    }

    /// Apply GUESSER_* environment overrides on top of `self`.
    pub fn apply_env_overrides(self) -> Self {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Same as `apply_env_overrides`, reading from an arbitrary lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("GUESSER_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(v) => {
                    self.seed = v;
                    eprintln!("[config] GUESSER_SEED = {v} (overrode default)");
                }
                Err(_) => eprintln!(
                    "[config] WARN: could not parse GUESSER_SEED = {:?} as u64; using {}",
                    raw, self.seed
                ),
            }
        }

        if let Some(raw) = lookup("GUESSER_BATCH_SIZE") {
            match raw.trim().parse::<usize>() {
                Ok(v) if v >= 1 => {
                    self.batch_size = v;
                    eprintln!("[config] GUESSER_BATCH_SIZE = {v} (overrode default)");
                }
                _ => eprintln!(
                    "[config] WARN: could not parse GUESSER_BATCH_SIZE = {:?} as usize >= 1; using {}",
                    raw, self.batch_size
                ),
            }
        }

        if let Some(raw) = lookup("GUESSER_ITERATIONS") {
            match raw.trim().parse::<usize>() {
                Ok(v) => {
                    self.iterations = v;
                    eprintln!("[config] GUESSER_ITERATIONS = {v} (overrode default)");
                }
                Err(_) => eprintln!(
                    "[config] WARN: could not parse GUESSER_ITERATIONS = {:?} as usize; using {}",
                    raw, self.iterations
                ),
            }
        }

        if let Some(raw) = lookup("GUESSER_DECAY_FACTOR") {
            match raw.trim().parse::<f64>() {
                Ok(v) if validate_decay_factor(v).is_ok() => {
                    self.rubric.decay_factor = v;
                    eprintln!("[config] GUESSER_DECAY_FACTOR = {v} (overrode default)");
                }
                _ => eprintln!(
                    "[config] WARN: could not parse GUESSER_DECAY_FACTOR = {:?} as f64 > 0; using {}",
                    raw, self.rubric.decay_factor
                ),
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::RubricKind;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_is_valid() {
        let cfg = ExperimentConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.action_space().unwrap().len(), 11);
    }

    #[test]
    fn target_outside_space_is_rejected() {
        let cfg = ExperimentConfig::default().with_target(11);
        match cfg.validate() {
            Err(GuesserError::Configuration { field, .. }) => assert_eq!(field, "target"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn zero_batch_is_rejected() {
        let cfg = ExperimentConfig::default().with_batch_size(0);
        assert!(cfg.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn degenerate_linear_is_rejected_at_validation() {
        let cfg = ExperimentConfig::default()
            .with_range(4, 4)
            .with_target(4)
            .with_rubric(RubricSpec::of(RubricKind::Linear));
        assert!(cfg.validate().unwrap_err().is_configuration());

        // Binary over a single action is fine.
        let cfg = cfg.with_rubric(RubricSpec::of(RubricKind::Binary));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn overrides_apply_when_parseable() {
        let cfg = ExperimentConfig::default().apply_overrides(lookup_from(&[
            ("GUESSER_SEED", "42"),
            ("GUESSER_BATCH_SIZE", "50"),
            ("GUESSER_ITERATIONS", "20"),
            ("GUESSER_DECAY_FACTOR", "2.5"),
        ]));
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.batch_size, 50);
        assert_eq!(cfg.iterations, 20);
        assert_eq!(cfg.rubric.decay_factor, 2.5);
    }

    #[test]
    fn bad_overrides_are_ignored() {
        let cfg = ExperimentConfig::default().apply_overrides(lookup_from(&[
            ("GUESSER_SEED", "not-a-number"),
            ("GUESSER_BATCH_SIZE", "0"),
            ("GUESSER_DECAY_FACTOR", "-1"),
        ]));
        assert_eq!(cfg, ExperimentConfig::default());
    }

    #[test]
    fn serde_fills_rubric_and_seed_defaults() {
        let json = r#"{"min":0,"max":99,"target":5,"batch_size":50,"iterations":50}"#;
        let cfg: ExperimentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.rubric, RubricSpec::default());
        assert_eq!(cfg.seed, DEFAULT_SEED);
    }
}
