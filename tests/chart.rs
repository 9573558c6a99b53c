use std::{fs, path::PathBuf};

use bench_chart::{
    record::read_records, render_csv, render_records, render::FileSurface, ChartConfig, ChartError,
};

const RESULTS: &str = "\
Algorithm,Dataset,Time(sec)
Exhaustive Search,1,0.0021
Backtracking,1,0.0008
Dynamic Programming,1,0.0004
Exhaustive Search,2,-1
Backtracking,2,1.73
Dynamic Programming,2,0.0009
Exhaustive Search,10,-1
Backtracking,10,-1
Dynamic Programming,10,0.012
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bench_chart_it_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn leftover_files(dir: &PathBuf) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn svg_chart_marks_timeouts() {
    let dir = scratch_dir("svg");
    let input = dir.join("benchmark.csv");
    fs::write(&input, RESULTS).unwrap();
    let config = ChartConfig {
        output: dir.join("chart.svg"),
        ..ChartConfig::default()
    };

    let summary = render_csv(&input, &config).unwrap();
    assert_eq!(summary.datasets, 3);
    assert_eq!(summary.algorithms, 3);
    assert_eq!(summary.bars, 6);
    assert_eq!(summary.timeouts, 3);
    assert_eq!(summary.baseline, 0.0002);
    let svg = fs::read_to_string(&config.output).unwrap();
    assert!(svg.matches("∅").count() >= 4);
    assert!(svg.contains("Dynamic Programming"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bitmap_chart_is_written_atomically() {
    let dir = scratch_dir("png");
    let records = read_records(RESULTS.as_bytes()).unwrap();
    let output = dir.join("chart.png");
    let config = ChartConfig {
        output: output.clone(),
        size: (640, 360),
        ..ChartConfig::default()
    };
    let mut surface = FileSurface::new(&output, config.size);

    let summary = render_records(&records, &config, &mut surface).unwrap();
    assert_eq!(summary.bars, 6);
    assert_eq!(leftover_files(&dir), vec!["chart.png".to_string()]);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn duplicate_rows_never_reach_the_surface() {
    let dir = scratch_dir("dup");
    let input = dir.join("benchmark.csv");
    fs::write(&input, format!("{}Backtracking,1,0.5\n", RESULTS)).unwrap();
    let config = ChartConfig {
        output: dir.join("chart.png"),
        ..ChartConfig::default()
    };

    match render_csv(&input, &config) {
        Err(ChartError::DuplicateKey { dataset, algorithm }) => {
            assert_eq!(dataset, "1");
            assert_eq!(algorithm, "Backtracking");
        }
        other => panic!("expected duplicate key error, got {:?}", other),
    }
    assert_eq!(leftover_files(&dir), vec!["benchmark.csv".to_string()]);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn header_only_file_is_empty_input() {
    let dir = scratch_dir("empty");
    let input = dir.join("benchmark.csv");
    fs::write(&input, "Algorithm,Dataset,Time(sec)\n").unwrap();
    let config = ChartConfig {
        output: dir.join("chart.png"),
        ..ChartConfig::default()
    };
    assert!(matches!(render_csv(&input, &config), Err(ChartError::EmptyInput)));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn huge_times_still_render() {
    let dir = scratch_dir("huge");
    let input = dir.join("benchmark.csv");
    fs::write(&input, "Dataset,Algorithm,Time(sec)\n1,A,0.5\n1,B,1e308\n").unwrap();
    let config = ChartConfig {
        output: dir.join("chart.svg"),
        ..ChartConfig::default()
    };
    let summary = render_csv(&input, &config).unwrap();
    assert_eq!(summary.bars, 2);
    assert!(config.output.exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn infinite_time_is_rejected_before_drawing() {
    let dir = scratch_dir("inf");
    let input = dir.join("benchmark.csv");
    fs::write(&input, "Dataset,Algorithm,Time(sec)\n1,A,0.5\n1,B,inf\n").unwrap();
    let config = ChartConfig {
        output: dir.join("chart.svg"),
        ..ChartConfig::default()
    };
    match render_csv(&input, &config) {
        Err(ChartError::InvalidRecord { dataset, algorithm, .. }) => {
            assert_eq!(dataset, "1");
            assert_eq!(algorithm, "B");
        }
        other => panic!("expected invalid record error, got {:?}", other),
    }
    assert_eq!(leftover_files(&dir), vec!["benchmark.csv".to_string()]);
    let _ = fs::remove_dir_all(&dir);
}
