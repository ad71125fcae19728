// src/sim_eval/output.rs
//
// Output schema for ablation runs. These files are what an external
// plotting step consumes; nothing here renders images.
//
// - <plan_id>.json: AblationReport (versioned, with determinism checksum)
// - <plan_id>.csv:  long-form trajectories (label,iteration,probability)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::ablation::AblationPlan;
use crate::config::ExperimentConfig;
use crate::experiment::ExperimentResult;
use crate::metrics::ConvergenceStats;

/// Output schema version.
pub const OUTPUT_SCHEMA_VERSION: u32 = 1;

/// One labelled trajectory plus its convergence summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub label: String,
    pub probs: Vec<f64>,
    pub convergence: ConvergenceStats,
}

impl From<&ExperimentResult> for ResultEntry {
    fn from(result: &ExperimentResult) -> Self {
        Self {
            label: result.label.clone(),
            probs: result.probs.clone(),
            convergence: result.convergence(),
        }
    }
}

/// Complete report for one ablation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AblationReport {
    pub schema_version: u32,
    pub guesser_version: String,
    pub plan_id: String,
    pub ablation: String,
    pub title: String,
    pub base: ExperimentConfig,
    pub results: Vec<ResultEntry>,
    /// SHA-256 over labels and trajectories.
    pub checksum: String,
}

impl AblationReport {
    pub fn new(plan: &AblationPlan, results: &[ExperimentResult]) -> Self {
        Self {
            schema_version: OUTPUT_SCHEMA_VERSION,
            guesser_version: env!("CARGO_PKG_VERSION").to_string(),
            plan_id: plan.id.clone(),
            ablation: plan.sweep.id().to_string(),
            title: plan.title.clone(),
            base: plan.base,
            results: results.iter().map(ResultEntry::from).collect(),
            checksum: compute_checksum(results),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Checksum over labels and exact probability bits, so two runs compare
/// equal only if every trajectory is bit-identical.
pub fn compute_checksum(results: &[ExperimentResult]) -> String {
    let mut hasher = Sha256::new();
    for r in results {
        hasher.update(r.label.as_bytes());
        hasher.update(b"|");
        hasher.update((r.probs.len() as u64).to_le_bytes());
        for p in &r.probs {
            hasher.update(p.to_bits().to_le_bytes());
        }
    }
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Long-form CSV of every trajectory: `label,iteration,probability`.
pub fn trajectories_csv(results: &[ExperimentResult]) -> String {
    let mut out = String::from("label,iteration,probability\n");
    for r in results {
        let label = csv_field(&r.label);
        for (i, p) in r.probs.iter().enumerate() {
            let _ = writeln!(out, "{},{},{}", label, i, p);
        }
    }
    out
}

fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Write a file atomically (temp file + rename).
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let temp_name = format!(
        ".tmp_{}_{}",
        std::process::id(),
        path.file_name()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default()
    );
    let temp_path = parent.join(&temp_name);

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Paths written by `write_report`.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// Write `<plan_id>.json` and `<plan_id>.csv` into `output_dir`.
pub fn write_report(
    output_dir: &Path,
    report: &AblationReport,
    results: &[ExperimentResult],
) -> io::Result<WrittenReport> {
    fs::create_dir_all(output_dir)?;
    let json = output_dir.join(format!("{}.json", report.plan_id));
    let csv = output_dir.join(format!("{}.csv", report.plan_id));

    let body = report.to_json_pretty()?;
    atomic_write(&json, body.as_bytes())?;
    atomic_write(&csv, trajectories_csv(results).as_bytes())?;
    Ok(WrittenReport { json, csv })
}
