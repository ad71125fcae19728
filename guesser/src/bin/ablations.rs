// src/bin/ablations.rs
//
// Ablation runner binary.
//
// Subcommands:
// - list:             print supported ablation IDs and descriptions
// - run <ID>...:      run built-in ablation presets (`all` for every preset)
// - plan <YAML>:      run an ablation plan loaded from YAML
// - gradient:         write the per-distance reward table of every rubric
//
// Usage:
//   cargo run -p guesser --bin ablations -- list
//   cargo run -p guesser --bin ablations -- run batch_size reward_function --threads 4
//   cargo run -p guesser --bin ablations -- plan plans/action_space.yaml --output-dir runs/custom
//   cargo run -p guesser --bin ablations -- gradient --output runs/reward_gradient.csv
//
// Every plan writes <plan_id>.json (report + checksum) and <plan_id>.csv
// (long-form trajectories) into the output directory.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};

use guesser::sim_eval::{
    atomic_write, parse_ablation_ids, print_ablations, write_report, AblationPlan, AblationReport,
    RewardGradient, DEFAULT_MAX_DISTANCE,
};
use guesser::{OnlineStats, DEFAULT_DECAY_FACTOR};

#[derive(Debug, Parser)]
#[command(
    name = "ablations",
    about = "Guesser ablation runner (research harness)",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List supported ablation IDs and descriptions.
    List,
    /// Run built-in ablation presets.
    Run {
        /// Ablation IDs (or `all`).
        #[arg(required = true)]
        ids: Vec<String>,
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Run an ablation plan loaded from a YAML file.
    Plan {
        path: PathBuf,
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Write the reward gradient table as CSV.
    Gradient {
        /// Largest distance in the table.
        #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE)]
        max_distance: u64,
        /// Decay factor of the exponential rubric.
        #[arg(long, default_value_t = DEFAULT_DECAY_FACTOR)]
        decay_factor: f64,
        /// Output CSV path; prints to stdout if omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, ClapArgs)]
struct RunOpts {
    /// Output directory for reports.
    #[arg(long, default_value = "runs/ablations")]
    output_dir: PathBuf,

    /// Worker threads (default: available parallelism).
    #[arg(long)]
    threads: Option<usize>,

    /// Override the plan's base seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Suppress per-result summary lines.
    #[arg(short, long)]
    quiet: bool,
}

impl RunOpts {
    fn threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

fn run_plan(mut plan: AblationPlan, opts: &RunOpts) -> Result<()> {
    if let Some(seed) = opts.seed {
        plan.base.seed = seed;
    }
    let threads = opts.threads();
    let started = Instant::now();

    let results = plan
        .run(threads)
        .with_context(|| format!("ablation '{}' failed", plan.id))?;
    let report = AblationReport::new(&plan, &results);
    let written = write_report(&opts.output_dir, &report, &results).with_context(|| {
        format!(
            "failed to write report into {}",
            opts.output_dir.display()
        )
    })?;

    println!(
        "{} | {} | runs={} | threads={} | elapsed={:.2}s | checksum={}",
        plan.id,
        plan.title,
        results.len(),
        threads,
        started.elapsed().as_secs_f64(),
        report.checksum
    );
    if !opts.quiet {
        for entry in &report.results {
            let c = &entry.convergence;
            let reached = c
                .iterations_to_threshold
                .map(|i| i.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<22} initial={:.6} final={:.6} peak={:.6} reached@{}={}",
                entry.label, c.initial, c.final_prob, c.peak, c.threshold, reached
            );
        }
        let finals: OnlineStats = report
            .results
            .iter()
            .map(|e| e.convergence.final_prob)
            .collect();
        println!(
            "  final across runs: mean={:.6} std={:.6} min={:.6} max={:.6}",
            finals.mean(),
            finals.stddev_population(),
            finals.min(),
            finals.max()
        );
    }
    println!("  wrote {}", written.json.display());
    println!("  wrote {}", written.csv.display());
    Ok(())
}

fn run_presets(ids: &[String], opts: &RunOpts) -> Result<()> {
    let ids = parse_ablation_ids(ids)?;
    for id in &ids {
        let plan = AblationPlan::preset(id)
            .with_context(|| format!("no built-in plan for ablation '{id}'"))?;
        run_plan(plan, opts)?;
    }
    Ok(())
}

fn write_gradient(max_distance: u64, decay_factor: f64, output: Option<&Path>) -> Result<()> {
    let table = RewardGradient::compute(max_distance, decay_factor)?;
    let csv = table.to_csv();
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            atomic_write(path, csv.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Command::List => {
            print_ablations();
            Ok(())
        }
        Command::Run { ids, opts } => run_presets(ids, opts),
        Command::Plan { path, opts } => AblationPlan::from_yaml_file(path)
            .map_err(anyhow::Error::from)
            .and_then(|plan| run_plan(plan, opts)),
        Command::Gradient {
            max_distance,
            decay_factor,
            output,
        } => write_gradient(*max_distance, *decay_factor, output.as_deref()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ablations: {e:#}");
            ExitCode::from(2)
        }
    }
}
