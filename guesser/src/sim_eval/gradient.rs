// src/sim_eval/gradient.rs
//
// Reward gradient table: per-guess reward of each rubric as a function of
// distance from the target, for comparing shaping curves side by side.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::action_space::MAX_ACTIONS;
use crate::error::{GuesserError, GuesserResult};
use crate::rubric::{BinaryRubric, ExponentialRubric, LinearRubric, Rubric, DEFAULT_DECAY_FACTOR};

pub const DEFAULT_MAX_DISTANCE: u64 = 100;

/// Rewards at distances `0..=max_distance` for each rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardGradient {
    pub max_distance: u64,
    pub decay_factor: f64,
    pub distances: Vec<u64>,
    pub binary: Vec<f64>,
    pub linear: Vec<f64>,
    pub exponential: Vec<f64>,
}

impl RewardGradient {
    /// Rubrics are built over `[0, max_distance]` with target 0, so the
    /// linear curve reaches zero exactly at `max_distance`. The table has
    /// at most `MAX_ACTIONS` rows.
    pub fn compute(max_distance: u64, decay_factor: f64) -> GuesserResult<Self> {
        let max = i64::try_from(max_distance)
            .ok()
            .filter(|&m| m < MAX_ACTIONS as i64)
            .ok_or_else(|| {
                GuesserError::config(
                    "max_distance",
                    format!("must be < {MAX_ACTIONS} (got {max_distance})"),
                )
            })?;
        let binary = BinaryRubric::new(0, 0, max)?;
        let linear = LinearRubric::new(0, 0, max)?;
        let exponential = ExponentialRubric::with_decay(0, 0, max, decay_factor)?;

        let distances: Vec<u64> = (0..=max_distance).collect();
        Ok(Self {
            max_distance,
            decay_factor,
            binary: curve(&binary, &distances),
            linear: curve(&linear, &distances),
            exponential: curve(&exponential, &distances),
            distances,
        })
    }

    pub fn default_table() -> GuesserResult<Self> {
        Self::compute(DEFAULT_MAX_DISTANCE, DEFAULT_DECAY_FACTOR)
    }

    /// `distance,binary,linear,exponential`, one row per distance.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("distance,binary,linear,exponential\n");
        for (i, d) in self.distances.iter().enumerate() {
            let _ = writeln!(
                out,
                "{},{},{},{}",
                d, self.binary[i], self.linear[i], self.exponential[i]
            );
        }
        out
    }
}

fn curve(rubric: &dyn Rubric, distances: &[u64]) -> Vec<f64> {
    distances
        .iter()
        .map(|&d| rubric.reward_at_distance(d))
        .collect()
}
