// src/main.rs
//
// Single-experiment CLI entrypoint for the guesser bandit.
//
// Constraints:
// - Config precedence: CLI flag > GUESSER_* env override > default.
// - Deterministic runs via --seed (ChaCha8 stream per run).
// - Prints the target probability every --print-every iterations,
//   starting with iteration 1.
// - Optional per-iteration JSONL telemetry via --events.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};

use guesser::config::ExperimentConfig;
use guesser::logging::{EventSink, IterationRecord, JsonlSink, NoopSink};
use guesser::rubric::{RubricKind, RubricSpec};
use guesser::run_experiment_with_sink;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RubricArg {
    Binary,
    Linear,
    Exponential,
}

impl From<RubricArg> for RubricKind {
    fn from(arg: RubricArg) -> Self {
        match arg {
            RubricArg::Binary => RubricKind::Binary,
            RubricArg::Linear => RubricKind::Linear,
            RubricArg::Exponential => RubricKind::Exponential,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "guesser",
    about = "Bandit agent learning to guess a target integer from shaped rewards",
    version
)]
struct Args {
    /// Smallest guessable integer.
    #[arg(long, allow_negative_numbers = true)]
    min: Option<i64>,

    /// Largest guessable integer.
    #[arg(long, allow_negative_numbers = true)]
    max: Option<i64>,

    /// Hidden target the rubric rewards.
    #[arg(long, allow_negative_numbers = true)]
    target: Option<i64>,

    /// Guesses sampled per iteration.
    /// If omitted, uses GUESSER_BATCH_SIZE (default 10).
    #[arg(long)]
    batch_size: Option<usize>,

    /// Number of sample/update iterations.
    /// If omitted, uses GUESSER_ITERATIONS (default 16).
    #[arg(long)]
    iterations: Option<usize>,

    /// Reward rubric.
    #[arg(long, value_enum, default_value_t = RubricArg::Binary)]
    rubric: RubricArg,

    /// Decay factor for the exponential rubric.
    #[arg(long)]
    decay_factor: Option<f64>,

    /// Deterministic seed. If omitted, uses GUESSER_SEED (default 1).
    #[arg(long)]
    seed: Option<u64>,

    /// Print the target probability every N iterations.
    #[arg(long, default_value_t = 2)]
    print_every: usize,

    /// Write per-iteration telemetry as JSONL to this path.
    #[arg(long)]
    events: Option<PathBuf>,

    /// Verbosity: -v prints every iteration's hits and reward mass.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn resolve(&self) -> ExperimentConfig {
        let mut cfg = ExperimentConfig::from_env();
        if let Some(min) = self.min {
            cfg.min = min;
        }
        if let Some(max) = self.max {
            cfg.max = max;
        }
        if let Some(target) = self.target {
            cfg.target = target;
        }
        if let Some(batch_size) = self.batch_size {
            cfg.batch_size = batch_size;
        }
        if let Some(iterations) = self.iterations {
            cfg.iterations = iterations;
        }
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        let decay_factor = self.decay_factor.unwrap_or(cfg.rubric.decay_factor);
        cfg.rubric = RubricSpec {
            kind: self.rubric.into(),
            decay_factor,
        };
        cfg
    }
}

/// Prints progress lines while forwarding records to the telemetry sink.
struct ProgressSink<S> {
    inner: S,
    print_every: usize,
    verbose: u8,
}

impl<S: EventSink> EventSink for ProgressSink<S> {
    fn log_iteration(&mut self, record: &IterationRecord) {
        if self.verbose > 0 {
            eprintln!(
                "[iter {}] hits={}/{} reward_mass={:.6}",
                record.iteration, record.hits, record.batch_size, record.reward_mass
            );
        }
        // Iterations 1, 1 + N, 1 + 2N, ...
        if self.print_every > 0 && (record.iteration - 1) % self.print_every == 0 {
            println!(
                "Iteration {}: P(guess={}) = {:.3}",
                record.iteration, record.target, record.target_probability
            );
        }
        self.inner.log_iteration(record);
    }
}

fn run(args: &Args, cfg: &ExperimentConfig) -> Result<Vec<f64>> {
    let space = cfg.action_space().context("invalid action range")?;
    let initial = 1.0 / space.len() as f64;
    println!("Target number: {}, Probability: {:.4}\n", cfg.target, initial);

    let probs = match &args.events {
        Some(path) => {
            let sink = JsonlSink::create(path)
                .with_context(|| format!("failed to create events file {}", path.display()))?;
            run_experiment_with_sink(cfg, progress(args, sink))?
        }
        None => run_experiment_with_sink(cfg, progress(args, NoopSink))?,
    };
    Ok(probs)
}

fn progress<S: EventSink>(args: &Args, inner: S) -> ProgressSink<S> {
    ProgressSink {
        inner,
        print_every: args.print_every,
        verbose: args.verbose,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    let cfg = args.resolve();

    if let Err(e) = cfg.validate() {
        eprintln!("guesser: {e}");
        return ExitCode::from(2);
    }

    eprintln!(
        "guesser | range=[{}, {}] | target={} | batch={} | iterations={} | rubric={} | seed={}",
        cfg.min, cfg.max, cfg.target, cfg.batch_size, cfg.iterations, cfg.rubric.kind, cfg.seed
    );

    match run(&args, &cfg) {
        Ok(probs) => {
            if args.verbose > 0 {
                if let Some(last) = probs.last() {
                    eprintln!("final P(guess={}) = {}", cfg.target, last);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("guesser: {e:#}");
            ExitCode::FAILURE
        }
    }
}
