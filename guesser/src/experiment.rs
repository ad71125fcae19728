// src/experiment.rs
//
// Experiment driver: sample -> evaluate -> update, repeated for a fixed
// number of iterations, recording the target probability each time.
//
// Each run owns a fresh Guesser, a fresh rubric and a ChaCha8 RNG seeded
// from the config, so a run is a pure function of its config.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agent::Guesser;
use crate::config::ExperimentConfig;
use crate::error::GuesserResult;
use crate::logging::{EventSink, IterationRecord, NoopSink};
use crate::metrics::{ConvergenceStats, DEFAULT_CONVERGENCE_THRESHOLD};

/// Labelled target-probability trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub label: String,
    /// `probs[0]` is the initial probability, then one entry per iteration.
    pub probs: Vec<f64>,
}

impl ExperimentResult {
    pub fn convergence(&self) -> ConvergenceStats {
        ConvergenceStats::from_trajectory(&self.probs, DEFAULT_CONVERGENCE_THRESHOLD)
    }
}

/// Run one experiment and return its probability trajectory.
pub fn run_experiment(cfg: &ExperimentConfig) -> GuesserResult<Vec<f64>> {
    run_experiment_with_sink(cfg, NoopSink)
}

/// Like `run_experiment`, also reporting every iteration to `sink`.
pub fn run_experiment_with_sink<S: EventSink>(
    cfg: &ExperimentConfig,
    mut sink: S,
) -> GuesserResult<Vec<f64>> {
    cfg.validate()?;

    let mut agent = Guesser::new(cfg.min, cfg.max)?;
    let rubric = cfg.rubric.build(cfg.target, cfg.min, cfg.max)?;
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);

    let mut probs = Vec::with_capacity(cfg.iterations + 1);
    probs.push(agent.probability_of(cfg.target));

    for i in 0..cfg.iterations {
        let guesses = agent.sample(cfg.batch_size, &mut rng)?;
        let reward = rubric.evaluate(&guesses)?;
        agent.update(&reward)?;

        let p = agent.probability_of(cfg.target);
        probs.push(p);

        sink.log_iteration(&IterationRecord {
            iteration: i + 1,
            target: cfg.target,
            target_probability: p,
            batch_size: cfg.batch_size,
            hits: guesses.iter().filter(|&&g| g == cfg.target).count(),
            reward_mass: reward.iter().sum(),
        });
    }

    Ok(probs)
}
