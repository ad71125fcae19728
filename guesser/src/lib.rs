//! Guesser core library.
//!
//! A discrete-action bandit simulator: an agent keeps a categorical policy
//! over a contiguous integer action range, samples batches of guesses from
//! it and reinforces it from batch-averaged reward vectors produced by a
//! pluggable reward rubric. The binaries (`src/main.rs`,
//! `src/bin/ablations.rs`) are thin research harnesses around it.
//!
//! # Architecture
//!
//! - **Agent** (`agent`): `Guesser`, the policy plus sample / update.
//! - **Rubrics** (`rubric`): `Rubric` trait with binary, linear and
//!   exponential reward shaping, selected through `RubricSpec`.
//! - **Driver** (`experiment`): seeded sample -> evaluate -> update loop
//!   recording the target probability trajectory.
//! - **Harness** (`sim_eval`): ablation sweeps, reports, reward gradients.
//!
//! The core never touches I/O. Everything outside `sim_eval::output` and
//! `logging::JsonlSink` is pure computation.

pub mod action_space;
pub mod agent;
pub mod config;
pub mod error;
pub mod experiment;
pub mod logging;
pub mod metrics;
pub mod rubric;
pub mod sim_eval;

// --- Re-exports for ergonomic external use ---------------------------------

pub use action_space::{ActionSpace, MAX_ACTIONS};
pub use agent::{Guesser, POLICY_FLOOR};
pub use config::ExperimentConfig;
pub use error::{GuesserError, GuesserResult};
pub use experiment::{run_experiment, run_experiment_with_sink, ExperimentResult};
pub use logging::{EventSink, IterationRecord, JsonlSink, NoopSink, VecSink};
pub use metrics::{ConvergenceStats, DrawdownTracker, OnlineStats};
pub use rubric::{
    BinaryRubric, ExponentialRubric, LinearRubric, Rubric, RubricKind, RubricSpec,
    DEFAULT_DECAY_FACTOR,
};

pub use sim_eval::{
    run_action_space_ablation, run_batch_size_ablation, run_reward_function_ablation,
    AblationPlan, AblationReport, LabeledRubric, RewardGradient, Sweep,
};
