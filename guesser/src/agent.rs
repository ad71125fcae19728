// src/agent.rs
//
// The guessing agent: a categorical policy over an integer action space.
//
// - new(min, max): uniform policy
// - sample(batch, rng): weighted draws with replacement
// - update(reward): policy = max(policy + reward, floor), then renormalise
//
// The policy is private, single-owner state. One agent per experiment.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::action_space::ActionSpace;
use crate::error::{GuesserError, GuesserResult};

/// Lower bound applied to every entry before renormalising.
pub const POLICY_FLOOR: f64 = 1e-8;

/// Agent holding a categorical policy over a fixed action range.
#[derive(Debug, Clone)]
pub struct Guesser {
    space: ActionSpace,
    policy: Vec<f64>,
}

impl Guesser {
    /// Construct an agent with a uniform policy over `[min, max]`.
    pub fn new(min: i64, max: i64) -> GuesserResult<Self> {
        Ok(Self::with_space(ActionSpace::new(min, max)?))
    }

    pub fn with_space(space: ActionSpace) -> Self {
        Self {
            space,
            policy: uniform(space.len()),
        }
    }

    pub fn action_space(&self) -> ActionSpace {
        self.space
    }

    pub fn policy(&self) -> &[f64] {
        &self.policy
    }

    /// Current probability of `action` (0.0 outside the action space).
    pub fn probability_of(&self, action: i64) -> f64 {
        self.space
            .index_of(action)
            .map(|i| self.policy[i])
            .unwrap_or(0.0)
    }

    /// Back to the uniform distribution.
    pub fn reset(&mut self) {
        self.policy = uniform(self.space.len());
    }

    /// Draw `batch_size` actions independently, with replacement, weighted
    /// by the current policy.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        batch_size: usize,
        rng: &mut R,
    ) -> GuesserResult<Vec<i64>> {
        if batch_size == 0 {
            return Err(GuesserError::EmptyBatch);
        }
        let dist =
            WeightedIndex::new(&self.policy).map_err(|e| GuesserError::DegeneratePolicy {
                reason: e.to_string(),
            })?;
        let min = self.space.min();
        Ok((0..batch_size)
            .map(|_| min.wrapping_add(dist.sample(rng) as i64))
            .collect())
    }

    /// Reinforce the policy with a batch-averaged reward vector.
    ///
    /// Validation happens before any mutation: on error the policy is
    /// exactly what it was before the call.
    pub fn update(&mut self, reward: &[f64]) -> GuesserResult<()> {
        if reward.len() != self.policy.len() {
            return Err(GuesserError::ShapeMismatch {
                expected: self.policy.len(),
                received: reward.len(),
            });
        }
        if let Some((index, &value)) = reward.iter().enumerate().find(|(_, r)| !r.is_finite()) {
            return Err(GuesserError::NonFiniteReward { index, value });
        }

        // Floor before renormalising.
        for (p, r) in self.policy.iter_mut().zip(reward) {
            *p = (*p + r).max(POLICY_FLOOR);
        }
        let total: f64 = self.policy.iter().sum();
        for p in &mut self.policy {
            *p /= total;
        }
        Ok(())
    }
}

fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}
