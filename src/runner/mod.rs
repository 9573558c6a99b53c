//! Benchmark driver: runs every algorithm command against every dataset file
//! under a wall-clock budget and records how long each run took.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::mpsc::channel,
    time::{Duration, Instant},
};

use glob::glob;
use log::{debug, info, warn};
use threadpool::ThreadPool;
use wait_timeout::ChildExt;

use crate::{
    error::ChartError,
    record::{dataset_order, BenchmarkRecord, TIMEOUT_SENTINEL},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmSpec {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl AlgorithmSpec {
    /// Parses `NAME=COMMAND [ARGS...]`.
    pub fn parse(spec: &str) -> Result<AlgorithmSpec, ChartError> {
        let (name, command) = spec.split_once('=').ok_or_else(|| {
            ChartError::InvalidConfig(format!("expected NAME=COMMAND, got '{}'", spec))
        })?;
        let mut words = command.split_whitespace().map(String::from);
        let program = words.next().ok_or_else(|| {
            ChartError::InvalidConfig(format!("algorithm '{}' has no command", name.trim()))
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ChartError::InvalidConfig(format!("algorithm name missing in '{}'", spec)));
        }
        Ok(AlgorithmSpec {
            name: name.to_string(),
            program,
            args: words.collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub pattern: String,
    pub algorithms: Vec<AlgorithmSpec>,
    pub timeout: Duration,
    pub jobs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunOutcome {
    Finished(f64),
    TimedOut,
    Failed,
}

impl RunOutcome {
    /// Elapsed seconds, or the sentinel for runs that did not finish.
    pub fn time_seconds(self) -> f64 {
        match self {
            RunOutcome::Finished(secs) => secs,
            RunOutcome::TimedOut | RunOutcome::Failed => TIMEOUT_SENTINEL,
        }
    }
}

/// Dataset files matching `pattern`, identified by file stem, in natural order.
/// Two files with the same stem would produce duplicate rows and are rejected.
pub fn discover_datasets(pattern: &str) -> Result<Vec<(String, PathBuf)>, ChartError> {
    let entries = glob(pattern)
        .map_err(|err| ChartError::InvalidConfig(format!("bad dataset pattern '{}': {}", pattern, err)))?;

    let mut datasets = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| ChartError::Io(err.into_error()))?;
        if !path.is_file() {
            continue;
        }
        let id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| ChartError::Runner(format!("invalid file name {:?}", path)))?
            .to_string();
        if let Some((_, first)) = datasets.iter().find(|(seen, _): &&(String, PathBuf)| *seen == id) {
            return Err(ChartError::Runner(format!(
                "dataset id '{}' matches both {:?} and {:?}",
                id, first, path
            )));
        }
        datasets.push((id, path));
    }
    datasets.sort_by(|a, b| dataset_order(&a.0, &b.0));
    Ok(datasets)
}

/// Runs `spec` on one dataset file, killing it once `timeout` has passed.
pub fn time_run(spec: &AlgorithmSpec, dataset: &Path, timeout: Duration) -> RunOutcome {
    let start = Instant::now();
    let mut child = match Command::new(&spec.program)
        .args(&spec.args)
        .arg(dataset)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(err) => {
            warn!("{}: could not start '{}': {}", spec.name, spec.program, err);
            return RunOutcome::Failed;
        }
    };

    match child.wait_timeout(timeout) {
        // A zero reading would be indistinguishable from the sentinel.
        Ok(Some(status)) if status.success() => RunOutcome::Finished(start.elapsed().as_secs_f64().max(1e-9)),
        Ok(Some(status)) => {
            warn!("{} on {:?} exited with {}", spec.name, dataset, status);
            RunOutcome::Failed
        }
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            debug!("{} on {:?} exceeded {:?}", spec.name, dataset, timeout);
            RunOutcome::TimedOut
        }
        Err(err) => {
            let _ = child.kill();
            let _ = child.wait();
            warn!("{} on {:?}: {}", spec.name, dataset, err);
            RunOutcome::Failed
        }
    }
}

/// Times every algorithm on every matched dataset on a pool of `jobs` workers.
pub fn run_benchmarks(config: &RunnerConfig) -> Result<Vec<BenchmarkRecord>, ChartError> {
    if config.algorithms.is_empty() {
        return Err(ChartError::Runner("no algorithms given".to_string()));
    }
    let mut names = HashSet::new();
    for spec in &config.algorithms {
        if !names.insert(spec.name.as_str()) {
            return Err(ChartError::Runner(format!("algorithm '{}' given more than once", spec.name)));
        }
    }
    let datasets = discover_datasets(&config.pattern)?;
    if datasets.is_empty() {
        return Err(ChartError::Runner(format!("no dataset files match '{}'", config.pattern)));
    }

    let expected = datasets.len() * config.algorithms.len();
    info!(
        "running {} algorithms on {} datasets ({} runs, budget {:?})",
        config.algorithms.len(),
        datasets.len(),
        expected,
        config.timeout
    );

    let pool = ThreadPool::new(config.jobs.max(1));
    let (tx, rx) = channel();
    for (dataset, path) in &datasets {
        for spec in &config.algorithms {
            let tx = tx.clone();
            let dataset = dataset.clone();
            let path = path.clone();
            let spec = spec.clone();
            let timeout = config.timeout;
            pool.execute(move || {
                let outcome = time_run(&spec, &path, timeout);
                let _ = tx.send(BenchmarkRecord::new(&dataset, &spec.name, outcome.time_seconds()));
            });
        }
    }
    drop(tx);

    let mut records: Vec<BenchmarkRecord> = rx.iter().collect();
    if records.len() != expected {
        return Err(ChartError::Runner(format!(
            "{} of {} runs did not report back",
            expected - records.len(),
            expected
        )));
    }
    records.sort_by(|a, b| dataset_order(&a.dataset, &b.dataset).then_with(|| a.algorithm.cmp(&b.algorithm)));

    let timeouts = records.iter().filter(|r| r.time_seconds <= 0.0).count();
    info!("{} runs finished, {} over budget or failed", records.len() - timeouts, timeouts);
    Ok(records)
}

#[cfg(test)]
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bench_chart_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
fn shell(name: &str, script: &str) -> AlgorithmSpec {
    AlgorithmSpec {
        name: name.to_string(),
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    }
}

#[test]
fn parses_algorithm_specs() {
    let spec = AlgorithmSpec::parse("Dynamic Programming=./knapsack --dp -q").unwrap();
    assert_eq!(spec.name, "Dynamic Programming");
    assert_eq!(spec.program, "./knapsack");
    assert_eq!(spec.args, vec!["--dp", "-q"]);

    assert!(AlgorithmSpec::parse("no-command").is_err());
    assert!(AlgorithmSpec::parse("Empty=  ").is_err());
    assert!(AlgorithmSpec::parse("=./solve").is_err());
}

#[test]
fn outcome_maps_to_sentinel() {
    assert_eq!(RunOutcome::Finished(0.3).time_seconds(), 0.3);
    assert_eq!(RunOutcome::TimedOut.time_seconds(), -1.0);
    assert_eq!(RunOutcome::Failed.time_seconds(), -1.0);
}

#[test]
fn discovers_datasets_in_natural_order() {
    let dir = scratch_dir("discover");
    for id in ["10", "2", "1"] {
        std::fs::write(dir.join(format!("{}.csv", id)), "x").unwrap();
    }
    std::fs::create_dir_all(dir.join("nested.csv")).unwrap();
    let pattern = format!("{}/*.csv", dir.display());
    let ids: Vec<String> = discover_datasets(&pattern).unwrap().into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["1", "2", "10"]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn slow_runs_are_cut_off() {
    let dir = scratch_dir("timeout");
    let data = dir.join("01.csv");
    std::fs::write(&data, "x").unwrap();

    let fast = time_run(&shell("Fast", "exit 0"), &data, Duration::from_secs(5));
    assert!(matches!(fast, RunOutcome::Finished(secs) if secs > 0.0));

    let slow = time_run(&shell("Slow", "sleep 5"), &data, Duration::from_millis(100));
    assert_eq!(slow, RunOutcome::TimedOut);

    let broken = time_run(&shell("Broken", "exit 3"), &data, Duration::from_secs(5));
    assert_eq!(broken, RunOutcome::Failed);
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn runs_every_pair_once() {
    let dir = scratch_dir("pairs");
    for id in ["1", "2", "3"] {
        std::fs::write(dir.join(format!("{}.txt", id)), "x").unwrap();
    }
    let config = RunnerConfig {
        pattern: format!("{}/*.txt", dir.display()),
        algorithms: vec![shell("Greedy", "exit 0"), shell("Exhaustive", "sleep 5")],
        timeout: Duration::from_millis(200),
        jobs: 3,
    };
    let records = run_benchmarks(&config).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].dataset, "1");
    assert_eq!(records[0].algorithm, "Exhaustive");
    assert!(records.iter().filter(|r| r.algorithm == "Exhaustive").all(|r| r.time_seconds == -1.0));
    assert!(records.iter().filter(|r| r.algorithm == "Greedy").all(|r| r.time_seconds > 0.0));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_match_is_an_error() {
    let config = RunnerConfig {
        pattern: "/nonexistent-bench-chart-dir/*.csv".to_string(),
        algorithms: vec![AlgorithmSpec::parse("A=true").unwrap()],
        timeout: Duration::from_secs(1),
        jobs: 1,
    };
    assert!(matches!(run_benchmarks(&config), Err(ChartError::Runner(_))));
}

#[test]
fn repeated_algorithm_names_are_rejected() {
    let dir = scratch_dir("dup_algo");
    std::fs::write(dir.join("1.csv"), "x").unwrap();
    let config = RunnerConfig {
        pattern: format!("{}/*.csv", dir.display()),
        algorithms: vec![
            AlgorithmSpec::parse("A=true").unwrap(),
            AlgorithmSpec::parse("A=false").unwrap(),
        ],
        timeout: Duration::from_secs(1),
        jobs: 1,
    };
    match run_benchmarks(&config) {
        Err(ChartError::Runner(msg)) => assert!(msg.contains("'A'")),
        other => panic!("expected runner error, got {:?}", other),
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn colliding_dataset_stems_are_rejected() {
    let dir = scratch_dir("dup_stem");
    for sub in ["a", "b"] {
        std::fs::create_dir_all(dir.join(sub)).unwrap();
        std::fs::write(dir.join(sub).join("1.csv"), "x").unwrap();
    }
    let pattern = format!("{}/*/*.csv", dir.display());
    match discover_datasets(&pattern) {
        Err(ChartError::Runner(msg)) => assert!(msg.contains("'1'")),
        other => panic!("expected runner error, got {:?}", other),
    }
    let _ = std::fs::remove_dir_all(&dir);
}
