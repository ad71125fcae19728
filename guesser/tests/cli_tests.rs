// tests/cli_tests.rs
//
// Smoke tests for the guesser and ablations binaries.
//
// These tests verify:
// 1. guesser prints the header and periodic probability lines
// 2. guesser exits with status 2 on invalid configuration
// 3. --events writes one JSONL record per iteration
// 4. ablations writes report files whose checksum ignores --threads
// 5. ablations rejects unknown ablation IDs

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn run_guesser(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_guesser"))
        .args(args)
        .env_remove("GUESSER_SEED")
        .env_remove("GUESSER_BATCH_SIZE")
        .env_remove("GUESSER_ITERATIONS")
        .env_remove("GUESSER_DECAY_FACTOR")
        .output()
        .expect("Failed to execute guesser binary")
}

fn run_ablations(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ablations"))
        .args(args)
        .output()
        .expect("Failed to execute ablations binary")
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&content).expect("Failed to parse JSON file")
}

#[test]
fn test_guesser_prints_progress() {
    let out = run_guesser(&["--iterations", "6", "--print-every", "2"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Target number: 6, Probability: 0.0909");
    assert_eq!(lines[1], "");
    assert_eq!(lines.len(), 5);
    assert!(lines[2].starts_with("Iteration 1: P(guess=6) = 0."));
    assert!(lines[3].starts_with("Iteration 3: P(guess=6) = "));
    assert!(lines[4].starts_with("Iteration 5: P(guess=6) = "));
    for line in &lines[2..] {
        let value = line.rsplit(' ').next().unwrap();
        assert_eq!(value.split('.').nth(1).map(str::len), Some(3), "{line}");
    }
}

#[test]
fn test_guesser_invalid_config_exits_2() {
    let out = run_guesser(&["--min", "0", "--max", "10", "--target", "42"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("target"));

    let out = run_guesser(&["--rubric", "exponential", "--decay-factor", "0"]);
    assert_eq!(out.status.code(), Some(2));

    let out = run_guesser(&[
        "--min",
        "-9223372036854775808",
        "--max",
        "9223372036854775807",
        "--target",
        "0",
    ]);
    assert_eq!(out.status.code(), Some(2));

    let out = run_guesser(&["--max", "10000000000000"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_guesser_writes_events() {
    let dir = tempdir().expect("Failed to create temp dir");
    let events = dir.path().join("events.jsonl");

    let out = run_guesser(&[
        "--rubric",
        "linear",
        "--iterations",
        "5",
        "--seed",
        "9",
        "--events",
        events.to_str().unwrap(),
    ]);
    assert!(out.status.success());

    let content = fs::read_to_string(&events).expect("Failed to read events file");
    let records: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("Failed to parse JSONL line"))
        .collect();
    assert_eq!(records.len(), 5);
    assert_eq!(records[4]["iteration"], 5);
    assert_eq!(records[0]["target"], 6);
}

#[test]
fn test_ablations_list() {
    let out = run_ablations(&["list"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    for id in guesser::sim_eval::VALID_ABLATION_IDS {
        assert!(stdout.contains(id));
    }
}

#[test]
fn test_ablations_run_is_thread_count_independent() {
    let dir1 = tempdir().expect("Failed to create temp dir 1");
    let dir4 = tempdir().expect("Failed to create temp dir 4");

    for (dir, threads) in [(&dir1, "1"), (&dir4, "4")] {
        let out = run_ablations(&[
            "run",
            "reward_function",
            "--threads",
            threads,
            "--quiet",
            "--output-dir",
            dir.path().to_str().unwrap(),
        ]);
        assert!(
            out.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&out.stderr)
        );
    }

    let r1 = read_json(&dir1.path().join("reward_function.json"));
    let r4 = read_json(&dir4.path().join("reward_function.json"));
    assert_eq!(r1["checksum"], r4["checksum"]);
    assert_eq!(r1["results"], r4["results"]);
    assert_eq!(r1["results"].as_array().map(|a| a.len()), Some(3));

    let csv = fs::read_to_string(dir1.path().join("reward_function.csv")).unwrap();
    assert!(csv.starts_with("label,iteration,probability\n"));
}

#[test]
fn test_ablations_plan_from_yaml() {
    let dir = tempdir().expect("Failed to create temp dir");
    let plan_path = dir.path().join("plan.yaml");
    fs::write(
        &plan_path,
        "id: tiny\n\
         title: Tiny batch sweep\n\
         base: { min: 0, max: 9, target: 3, batch_size: 5, iterations: 4, seed: 2 }\n\
         sweep: { type: batch_size, sizes: [5, 10] }\n",
    )
    .unwrap();

    let out_dir = dir.path().join("out");
    let out = run_ablations(&[
        "plan",
        plan_path.to_str().unwrap(),
        "--output-dir",
        out_dir.to_str().unwrap(),
    ]);
    assert!(out.status.success());

    let report = read_json(&out_dir.join("tiny.json"));
    assert_eq!(report["ablation"], "batch_size");
    assert_eq!(report["results"][1]["label"], "Batch Size: 10");
    assert_eq!(report["results"][0]["probs"].as_array().map(|a| a.len()), Some(5));
}

#[test]
fn test_ablations_unknown_id_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let out = run_ablations(&[
        "run",
        "not_an_ablation",
        "--output-dir",
        dir.path().to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Valid ablation IDs"));
}

#[test]
fn test_ablations_gradient_csv() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("gradient.csv");
    let out = run_ablations(&[
        "gradient",
        "--max-distance",
        "10",
        "--output",
        path.to_str().unwrap(),
    ]);
    assert!(out.status.success());

    let csv = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "distance,binary,linear,exponential");
    assert_eq!(lines.len(), 12);
    assert!(lines[11].starts_with("10,0,0,"));
}
