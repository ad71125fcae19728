// src/sim_eval/ablation.rs
//
// Ablation harness: sweep one experiment parameter while holding the rest
// fixed, to study how it affects convergence toward the target.
//
// Supported ablations:
// - action_space:    vary the number of actions (min = 0, max = n - 1)
// - batch_size:      vary guesses per iteration
// - reward_function: vary the reward rubric
//
// Plans are YAML-loadable. Experiment i of a sweep runs with seed
// base.seed + i, so results do not depend on how many threads run them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::thread;

use crate::action_space::MAX_ACTIONS;
use crate::config::ExperimentConfig;
use crate::error::{GuesserError, GuesserResult};
use crate::experiment::{run_experiment, ExperimentResult};
use crate::rubric::{RubricKind, RubricSpec};

/// All valid ablation IDs.
/// These are stable strings that must not change across versions.
pub const VALID_ABLATION_IDS: &[&str] = &["action_space", "batch_size", "reward_function"];

/// Ablation descriptions for the `list` subcommand.
pub const ABLATION_DESCRIPTIONS: &[(&str, &str)] = &[
    (
        "action_space",
        "Vary action-space size (0..n-1) with target, batch size and rubric fixed",
    ),
    (
        "batch_size",
        "Vary guesses per iteration with action space, target and rubric fixed",
    ),
    (
        "reward_function",
        "Vary the reward rubric (binary / exponential / linear) with everything else fixed",
    ),
];

/// Current plan schema version.
pub const PLAN_SCHEMA_VERSION: u32 = 1;

/// A rubric entry of a reward-function sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRubric {
    pub label: String,
    pub rubric: RubricSpec,
}

impl LabeledRubric {
    pub fn new(label: impl Into<String>, rubric: RubricSpec) -> Self {
        Self {
            label: label.into(),
            rubric,
        }
    }
}

/// The parameter being swept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Sweep {
    ActionSpace { sizes: Vec<usize> },
    BatchSize { sizes: Vec<usize> },
    RewardFunction { rubrics: Vec<LabeledRubric> },
}

impl Sweep {
    /// Stable ablation ID of this sweep.
    pub fn id(&self) -> &'static str {
        match self {
            Sweep::ActionSpace { .. } => "action_space",
            Sweep::BatchSize { .. } => "batch_size",
            Sweep::RewardFunction { .. } => "reward_function",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Sweep::ActionSpace { sizes } | Sweep::BatchSize { sizes } => sizes.len(),
            Sweep::RewardFunction { rubrics } => rubrics.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fully specified ablation: base experiment + swept parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AblationPlan {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Used for output file names.
    pub id: String,
    /// Human-readable title for plots / reports.
    pub title: String,
    pub base: ExperimentConfig,
    pub sweep: Sweep,
}

fn default_schema_version() -> u32 {
    PLAN_SCHEMA_VERSION
}

impl AblationPlan {
    /// Built-in plan for a valid ablation ID.
    pub fn preset(id: &str) -> Option<AblationPlan> {
        let base = ExperimentConfig::default();
        match id {
            "action_space" => Some(AblationPlan {
                schema_version: PLAN_SCHEMA_VERSION,
                id: id.to_string(),
                title: "Effect of Action Space Size".to_string(),
                base: base
                    .with_range(0, 8)
                    .with_target(5)
                    .with_batch_size(50)
                    .with_iterations(50),
                sweep: Sweep::ActionSpace {
                    sizes: vec![9, 99, 999],
                },
            }),
            "batch_size" => Some(AblationPlan {
                schema_version: PLAN_SCHEMA_VERSION,
                id: id.to_string(),
                title: "Effect of Batch Size".to_string(),
                base: base
                    .with_range(0, 1000)
                    .with_target(5)
                    .with_batch_size(50)
                    .with_iterations(50),
                sweep: Sweep::BatchSize {
                    sizes: vec![50, 100, 200],
                },
            }),
            "reward_function" => Some(AblationPlan {
                schema_version: PLAN_SCHEMA_VERSION,
                id: id.to_string(),
                title: "Effect of Reward Function".to_string(),
                base: base
                    .with_range(0, 100)
                    .with_target(50)
                    .with_batch_size(50)
                    .with_iterations(100),
                sweep: Sweep::RewardFunction {
                    rubrics: [
                        RubricKind::Binary,
                        RubricKind::Exponential,
                        RubricKind::Linear,
                    ]
                    .into_iter()
                    .map(|k| LabeledRubric::new(k.label(), RubricSpec::of(k)))
                    .collect(),
                },
            }),
            _ => None,
        }
    }

    /// Load a plan from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, AblationError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|e| AblationError::IoError {
            path: path.as_ref().display().to_string(),
            source: e.to_string(),
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate a plan from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AblationError> {
        let plan: AblationPlan =
            serde_yaml::from_str(yaml).map_err(|e| AblationError::ParseError {
                source: e.to_string(),
            })?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn to_yaml(&self) -> Result<String, AblationError> {
        serde_yaml::to_string(self).map_err(|e| AblationError::ParseError {
            source: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), AblationError> {
        if self.id.trim().is_empty() {
            return Err(GuesserError::config("id", "plan id cannot be empty").into());
        }
        if self.sweep.is_empty() {
            return Err(GuesserError::config("sweep", "sweep must contain at least one value").into());
        }
        self.expand()?;
        Ok(())
    }

    /// Expand into labelled, validated experiment configs, in sweep order.
    pub fn expand(&self) -> GuesserResult<Vec<(String, ExperimentConfig)>> {
        let base = self.base;
        let configs: Vec<(String, ExperimentConfig)> = match &self.sweep {
            Sweep::ActionSpace { sizes } => sizes
                .iter()
                .map(|&n| {
                    if n == 0 || n > MAX_ACTIONS {
                        return Err(GuesserError::config(
                            "sweep.sizes",
                            format!("action-space size must be in 1..={MAX_ACTIONS} (got {n})"),
                        ));
                    }
                    let max = i64::try_from(n - 1).map_err(|_| {
                        GuesserError::config("sweep.sizes", format!("size {n} does not fit i64"))
                    })?;
                    Ok((format!("Action Space: {n}"), base.with_range(0, max)))
                })
                .collect::<GuesserResult<_>>()?,
            Sweep::BatchSize { sizes } => sizes
                .iter()
                .map(|&b| (format!("Batch Size: {b}"), base.with_batch_size(b)))
                .collect(),
            Sweep::RewardFunction { rubrics } => rubrics
                .iter()
                .map(|r| (r.label.clone(), base.with_rubric(r.rubric)))
                .collect(),
        };

        configs
            .into_iter()
            .enumerate()
            .map(|(i, (label, cfg))| {
                let cfg = cfg.with_seed(base.seed.wrapping_add(i as u64));
                cfg.validate()?;
                Ok((label, cfg))
            })
            .collect()
    }

    /// Run every experiment of the plan on up to `threads` worker threads.
    pub fn run(&self, threads: usize) -> GuesserResult<Vec<ExperimentResult>> {
        run_labeled(self.expand()?, threads)
    }
}

/// Run labelled configs, returning results in input order.
///
/// With `threads > 1` the configs are split into contiguous chunks, one per
/// scoped thread. Every experiment owns its agent, rubric and RNG.
pub fn run_labeled(
    configs: Vec<(String, ExperimentConfig)>,
    threads: usize,
) -> GuesserResult<Vec<ExperimentResult>> {
    if threads == 0 {
        return Err(GuesserError::config("threads", "must be >= 1"));
    }
    let run_one = |(label, cfg): &(String, ExperimentConfig)| -> GuesserResult<ExperimentResult> {
        Ok(ExperimentResult {
            label: label.clone(),
            probs: run_experiment(cfg)?,
        })
    };

    if threads == 1 || configs.len() <= 1 {
        return configs.iter().map(run_one).collect();
    }

    let chunk = configs.len().div_ceil(threads);
    thread::scope(|s| {
        let handles: Vec<_> = configs
            .chunks(chunk)
            .map(|part| s.spawn(move || part.iter().map(run_one).collect::<Vec<_>>()))
            .collect();

        let mut out = Vec::with_capacity(configs.len());
        for handle in handles {
            let part = handle
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload));
            for r in part {
                out.push(r?);
            }
        }
        Ok(out)
    })
}

/// Action-space sweep: one run per size `n` over `[0, n - 1]`.
pub fn run_action_space_ablation(
    base: &ExperimentConfig,
    sizes: &[usize],
) -> GuesserResult<Vec<ExperimentResult>> {
    sweep_plan(base, Sweep::ActionSpace { sizes: sizes.to_vec() }).run(1)
}

/// Batch-size sweep over the base action space.
pub fn run_batch_size_ablation(
    base: &ExperimentConfig,
    sizes: &[usize],
) -> GuesserResult<Vec<ExperimentResult>> {
    sweep_plan(base, Sweep::BatchSize { sizes: sizes.to_vec() }).run(1)
}

/// Reward-function sweep; labels come from the caller.
pub fn run_reward_function_ablation(
    base: &ExperimentConfig,
    rubrics: &[LabeledRubric],
) -> GuesserResult<Vec<ExperimentResult>> {
    sweep_plan(
        base,
        Sweep::RewardFunction {
            rubrics: rubrics.to_vec(),
        },
    )
    .run(1)
}

fn sweep_plan(base: &ExperimentConfig, sweep: Sweep) -> AblationPlan {
    AblationPlan {
        schema_version: PLAN_SCHEMA_VERSION,
        id: sweep.id().to_string(),
        title: sweep.id().to_string(),
        base: *base,
        sweep,
    }
}

/// Validate, sort and dedup ablation IDs. `all` expands to every ID.
pub fn parse_ablation_ids(ids: &[String]) -> Result<Vec<String>, AblationError> {
    let mut set = BTreeSet::new();
    for id in ids {
        if id == "all" {
            set.extend(VALID_ABLATION_IDS.iter().map(|s| s.to_string()));
            continue;
        }
        if !VALID_ABLATION_IDS.contains(&id.as_str()) {
            return Err(AblationError::UnknownAblation {
                id: id.clone(),
                valid: VALID_ABLATION_IDS.iter().map(|s| s.to_string()).collect(),
            });
        }
        set.insert(id.clone());
    }
    Ok(set.into_iter().collect())
}

/// Errors related to ablation plans.
#[derive(Debug, Clone)]
pub enum AblationError {
    /// An unknown ablation ID was specified.
    UnknownAblation { id: String, valid: Vec<String> },
    IoError { path: String, source: String },
    ParseError { source: String },
    /// The plan parsed but describes an invalid experiment.
    Invalid(GuesserError),
}

impl fmt::Display for AblationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AblationError::UnknownAblation { id, valid } => {
                write!(
                    f,
                    "Unknown ablation ID '{}'. Valid ablation IDs are: {}",
                    id,
                    valid.join(", ")
                )
            }
            AblationError::IoError { path, source } => {
                write!(f, "Failed to read ablation plan '{}': {}", path, source)
            }
            AblationError::ParseError { source } => {
                write!(f, "Failed to parse ablation plan YAML: {}", source)
            }
            AblationError::Invalid(err) => write!(f, "Invalid ablation plan: {}", err),
        }
    }
}

impl std::error::Error for AblationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AblationError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GuesserError> for AblationError {
    fn from(value: GuesserError) -> Self {
        AblationError::Invalid(value)
    }
}

/// Print the list of supported ablations and their descriptions.
pub fn print_ablations() {
    println!("Supported ablation IDs:");
    println!();
    for (id, desc) in ABLATION_DESCRIPTIONS {
        println!("  {:<18} {}", id, desc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_base() -> ExperimentConfig {
        ExperimentConfig::default()
            .with_range(0, 20)
            .with_target(5)
            .with_batch_size(16)
            .with_iterations(10)
            .with_seed(3)
    }

    #[test]
    fn every_valid_id_has_a_preset_and_description() {
        for id in VALID_ABLATION_IDS {
            let plan = AblationPlan::preset(id).expect("preset");
            assert_eq!(plan.sweep.id(), *id);
            assert!(plan.validate().is_ok(), "{id} preset invalid");
            assert!(ABLATION_DESCRIPTIONS.iter().any(|(d, _)| d == id));
        }
        assert!(AblationPlan::preset("learning_rate").is_none());
    }

    #[test]
    fn action_space_labels_and_ranges() {
        let plan = sweep_plan(&small_base(), Sweep::ActionSpace { sizes: vec![9, 99] });
        let configs = plan.expand().unwrap();
        assert_eq!(configs[0].0, "Action Space: 9");
        assert_eq!((configs[0].1.min, configs[0].1.max), (0, 8));
        assert_eq!((configs[1].1.min, configs[1].1.max), (0, 98));
    }

    #[test]
    fn seeds_offset_by_sweep_index() {
        let plan = sweep_plan(&small_base(), Sweep::BatchSize { sizes: vec![1, 2, 3] });
        let seeds: Vec<u64> = plan.expand().unwrap().iter().map(|(_, c)| c.seed).collect();
        assert_eq!(seeds, vec![3, 4, 5]);
    }

    #[test]
    fn action_space_too_small_for_target_is_rejected() {
        // target 5 does not fit in 0..=3
        let plan = sweep_plan(&small_base(), Sweep::ActionSpace { sizes: vec![4] });
        assert!(plan.expand().unwrap_err().is_configuration());
    }

    #[test]
    fn zero_size_is_rejected() {
        let plan = sweep_plan(&small_base(), Sweep::ActionSpace { sizes: vec![0] });
        assert!(plan.validate().is_err());
    }

    #[test]
    fn oversized_action_space_is_rejected() {
        for n in [MAX_ACTIONS + 1, usize::MAX] {
            let plan = sweep_plan(&small_base(), Sweep::ActionSpace { sizes: vec![n] });
            assert!(plan.expand().unwrap_err().is_configuration());
        }
    }

    #[test]
    fn threaded_run_matches_sequential() {
        let plan = sweep_plan(
            &small_base(),
            Sweep::BatchSize {
                sizes: vec![4, 8, 16, 32, 64],
            },
        );
        let seq = plan.run(1).unwrap();
        let par = plan.run(3).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq.len(), 5);
        assert_eq!(seq[2].label, "Batch Size: 16");
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(run_labeled(Vec::new(), 0).is_err());
    }

    #[test]
    fn parse_ids_sorts_dedups_and_expands_all() {
        let ids = vec![
            "reward_function".to_string(),
            "batch_size".to_string(),
            "batch_size".to_string(),
        ];
        assert_eq!(
            parse_ablation_ids(&ids).unwrap(),
            vec!["batch_size".to_string(), "reward_function".to_string()]
        );
        assert_eq!(
            parse_ablation_ids(&["all".to_string()]).unwrap().len(),
            VALID_ABLATION_IDS.len()
        );
    }

    #[test]
    fn unknown_id_lists_valid_ones() {
        let err = parse_ablation_ids(&["cosine".to_string()]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cosine"));
        assert!(msg.contains("action_space"));
    }

    #[test]
    fn yaml_round_trip() {
        let plan = AblationPlan::preset("reward_function").unwrap();
        let yaml = plan.to_yaml().unwrap();
        let parsed = AblationPlan::from_yaml_str(&yaml).unwrap();
        assert_eq!(plan, parsed);
    }

    #[test]
    fn yaml_with_defaults() {
        let yaml = r#"
id: decay_sweep
title: Exponential decay
base:
  min: 0
  max: 50
  target: 25
  batch_size: 20
  iterations: 30
sweep:
  type: reward_function
  rubrics:
    - label: "decay 1"
      rubric: { kind: exponential, decay_factor: 1.0 }
    - label: "decay 10"
      rubric: { kind: exponential, decay_factor: 10.0 }
"#;
        let plan = AblationPlan::from_yaml_str(yaml).unwrap();
        assert_eq!(plan.schema_version, PLAN_SCHEMA_VERSION);
        assert_eq!(plan.base.seed, 1);
        assert_eq!(plan.sweep.len(), 2);
    }

    #[test]
    fn yaml_validation_error_is_reported() {
        let yaml = r#"
id: bad
title: bad
base: { min: 0, max: 5, target: 2, batch_size: 4, iterations: 3 }
sweep:
  type: reward_function
  rubrics:
    - label: broken
      rubric: { kind: exponential, decay_factor: 0.0 }
"#;
        match AblationPlan::from_yaml_str(yaml) {
            Err(AblationError::Invalid(e)) => assert!(e.is_configuration()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn yaml_parse_error_is_reported() {
        assert!(matches!(
            AblationPlan::from_yaml_str("id: [unclosed"),
            Err(AblationError::ParseError { .. })
        ));
    }
}
