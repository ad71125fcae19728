// src/rubric.rs
//
// Reward rubrics: turn a batch of guesses into a batch-averaged reward
// vector over the whole action space.
//
// Variants (d = |guess - target|):
// - Binary:      1 if d == 0 else 0
// - Linear:      1 - d / (max - min), not clamped below zero
// - Exponential: exp(-d / decay_factor)
//
// The set is closed; `RubricSpec` picks one at experiment construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action_space::ActionSpace;
use crate::error::{GuesserError, GuesserResult};

/// Default decay factor for the exponential rubric.
pub const DEFAULT_DECAY_FACTOR: f64 = 5.0;

/// Reward-shaping strategy.
pub trait Rubric: fmt::Debug + Send + Sync {
    fn kind(&self) -> RubricKind;

    fn target(&self) -> i64;

    fn action_space(&self) -> ActionSpace;

    /// Per-guess reward for a guess at distance `d` from the target.
    fn reward_at_distance(&self, d: u64) -> f64;

    /// Evaluate a batch of guesses into a reward vector of length
    /// `action_space().len()`, divided by the batch size.
    fn evaluate(&self, guesses: &[i64]) -> GuesserResult<Vec<f64>> {
        if guesses.is_empty() {
            return Err(GuesserError::EmptyBatch);
        }
        let space = self.action_space();
        let target = self.target();
        let mut rewards = vec![0.0; space.len()];
        for &guess in guesses {
            let idx = space.checked_index(guess)?;
            rewards[idx] += self.reward_at_distance(guess.abs_diff(target));
        }
        let n = guesses.len() as f64;
        for r in &mut rewards {
            *r /= n;
        }
        Ok(rewards)
    }
}

/// Sparse reward: only an exact hit pays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryRubric {
    target: i64,
    space: ActionSpace,
}

impl BinaryRubric {
    pub fn new(target: i64, min: i64, max: i64) -> GuesserResult<Self> {
        Ok(Self {
            target,
            space: ActionSpace::new(min, max)?,
        })
    }
}

impl Rubric for BinaryRubric {
    fn kind(&self) -> RubricKind {
        RubricKind::Binary
    }

    fn target(&self) -> i64 {
        self.target
    }

    fn action_space(&self) -> ActionSpace {
        self.space
    }

    fn reward_at_distance(&self, d: u64) -> f64 {
        if d == 0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Reward falling linearly from 1 at the target to 0 at the range width.
///
/// Distances beyond the range width (only possible with a target outside
/// the action space) give negative rewards; they are left unclamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRubric {
    target: i64,
    space: ActionSpace,
    max_distance: f64,
}

impl LinearRubric {
    pub fn new(target: i64, min: i64, max: i64) -> GuesserResult<Self> {
        let space = ActionSpace::new(min, max)?;
        if space.span() == 0 {
            return Err(GuesserError::config(
                "max",
                format!("linear rubric needs max > min (got min = max = {min})"),
            ));
        }
        Ok(Self {
            target,
            space,
            max_distance: space.span() as f64,
        })
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }
}

impl Rubric for LinearRubric {
    fn kind(&self) -> RubricKind {
        RubricKind::Linear
    }

    fn target(&self) -> i64 {
        self.target
    }

    fn action_space(&self) -> ActionSpace {
        self.space
    }

    fn reward_at_distance(&self, d: u64) -> f64 {
        1.0 - d as f64 / self.max_distance
    }
}

/// Reward decaying as exp(-d / decay_factor); always in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialRubric {
    target: i64,
    space: ActionSpace,
    decay_factor: f64,
}

impl ExponentialRubric {
    pub fn new(target: i64, min: i64, max: i64) -> GuesserResult<Self> {
        Self::with_decay(target, min, max, DEFAULT_DECAY_FACTOR)
    }

    pub fn with_decay(target: i64, min: i64, max: i64, decay_factor: f64) -> GuesserResult<Self> {
        let space = ActionSpace::new(min, max)?;
        validate_decay_factor(decay_factor)?;
        Ok(Self {
            target,
            space,
            decay_factor,
        })
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }
}

impl Rubric for ExponentialRubric {
    fn kind(&self) -> RubricKind {
        RubricKind::Exponential
    }

    fn target(&self) -> i64 {
        self.target
    }

    fn action_space(&self) -> ActionSpace {
        self.space
    }

    fn reward_at_distance(&self, d: u64) -> f64 {
        (-(d as f64) / self.decay_factor).exp()
    }
}

pub(crate) fn validate_decay_factor(decay_factor: f64) -> GuesserResult<()> {
    if !decay_factor.is_finite() || decay_factor <= 0.0 {
        return Err(GuesserError::config(
            "decay_factor",
            format!("must be a finite value > 0 (got {decay_factor})"),
        ));
    }
    Ok(())
}

// =============================================================================
// Selection
// =============================================================================

/// Rubric variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricKind {
    Binary,
    Linear,
    Exponential,
}

impl RubricKind {
    pub const ALL: [RubricKind; 3] = [
        RubricKind::Binary,
        RubricKind::Linear,
        RubricKind::Exponential,
    ];

    /// Stable lowercase name (used in labels, CSV headers and CLI flags).
    pub fn as_str(&self) -> &'static str {
        match self {
            RubricKind::Binary => "binary",
            RubricKind::Linear => "linear",
            RubricKind::Exponential => "exponential",
        }
    }

    /// Parse a rubric name (case-insensitive). Returns None if unrecognized.
    pub fn parse(s: &str) -> Option<RubricKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" | "b" => Some(RubricKind::Binary),
            "linear" | "lin" | "l" => Some(RubricKind::Linear),
            "exponential" | "exp" | "e" => Some(RubricKind::Exponential),
            _ => None,
        }
    }

    /// Label used by the reward-function ablation.
    pub fn label(&self) -> &'static str {
        match self {
            RubricKind::Binary => "Binary Reward",
            RubricKind::Linear => "Linear Reward",
            RubricKind::Exponential => "Exponential Reward",
        }
    }
}

impl fmt::Display for RubricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializable rubric choice plus its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricSpec {
    pub kind: RubricKind,
    /// Only read by the exponential rubric.
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f64,
}

fn default_decay_factor() -> f64 {
    DEFAULT_DECAY_FACTOR
}

impl Default for RubricSpec {
    fn default() -> Self {
        Self::of(RubricKind::Binary)
    }
}

impl RubricSpec {
    pub fn of(kind: RubricKind) -> Self {
        Self {
            kind,
            decay_factor: DEFAULT_DECAY_FACTOR,
        }
    }

    pub fn exponential(decay_factor: f64) -> Self {
        Self {
            kind: RubricKind::Exponential,
            decay_factor,
        }
    }

    /// Check parameters without building (used by config validation).
    pub fn validate(&self) -> GuesserResult<()> {
        if self.kind == RubricKind::Exponential {
            validate_decay_factor(self.decay_factor)?;
        }
        Ok(())
    }

    /// Construct the rubric for a target and action range.
    pub fn build(&self, target: i64, min: i64, max: i64) -> GuesserResult<Box<dyn Rubric>> {
        Ok(match self.kind {
            RubricKind::Binary => Box::new(BinaryRubric::new(target, min, max)?),
            RubricKind::Linear => Box::new(LinearRubric::new(target, min, max)?),
            RubricKind::Exponential => Box::new(ExponentialRubric::with_decay(
                target,
                min,
                max,
                self.decay_factor,
            )?),
        })
    }
}
