// src/sim_eval/mod.rs
//
// Research harness around the core: ablation sweeps, report output and the
// reward gradient table.
//
// - AblationPlan: YAML-loadable sweep over one experiment parameter
// - AblationReport: versioned JSON output with determinism checksum
// - RewardGradient: per-distance reward of every rubric
//
// Design principle: a plan fully defines its runs, outputs are comparable
// across machines and thread counts.

pub mod ablation;
pub mod gradient;
pub mod output;

pub use ablation::{
    parse_ablation_ids, print_ablations, run_action_space_ablation, run_batch_size_ablation,
    run_labeled, run_reward_function_ablation, AblationError, AblationPlan, LabeledRubric, Sweep,
    ABLATION_DESCRIPTIONS, PLAN_SCHEMA_VERSION, VALID_ABLATION_IDS,
};
pub use gradient::{RewardGradient, DEFAULT_MAX_DISTANCE};
pub use output::{
    atomic_write, compute_checksum, trajectories_csv, write_report, AblationReport, ResultEntry,
    WrittenReport, OUTPUT_SCHEMA_VERSION,
};
