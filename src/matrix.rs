use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::{
    error::ChartError,
    record::{dataset_order, BenchmarkRecord},
};

/// Dataset × algorithm table of measured times. `None` marks a pair for which
/// no run was recorded at all, which is distinct from a timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMatrix {
    pub datasets: Vec<String>,
    pub algorithms: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl ResultMatrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.datasets.len(), self.algorithms.len())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }
}

/// Pivots flat records into a [`ResultMatrix`]. Rows follow natural dataset
/// order, columns sorted algorithm names.
pub fn build(records: &[BenchmarkRecord]) -> Result<ResultMatrix, ChartError> {
    let _span = flame::start_guard("matrix::build");
    if records.is_empty() {
        return Err(ChartError::EmptyInput);
    }

    let mut values: HashMap<(&str, &str), f64> = HashMap::with_capacity(records.len());
    for record in records {
        if !record.time_seconds.is_finite() {
            return Err(ChartError::InvalidRecord {
                dataset: record.dataset.clone(),
                algorithm: record.algorithm.clone(),
                time: record.time_seconds,
            });
        }
        let key = (record.dataset.as_str(), record.algorithm.as_str());
        if values.insert(key, record.time_seconds).is_some() {
            return Err(ChartError::DuplicateKey {
                dataset: record.dataset.clone(),
                algorithm: record.algorithm.clone(),
            });
        }
    }

    let mut datasets: Vec<String> = records
        .iter()
        .map(|r| r.dataset.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();
    datasets.sort_by(|a, b| dataset_order(a, b));

    let algorithms: Vec<String> = records
        .iter()
        .map(|r| r.algorithm.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect();

    let cells = datasets
        .iter()
        .map(|ds| {
            algorithms
                .iter()
                .map(|algo| values.get(&(ds.as_str(), algo.as_str())).copied())
                .collect()
        })
        .collect();

    debug!("result matrix: {} datasets x {} algorithms", datasets.len(), algorithms.len());
    Ok(ResultMatrix {
        datasets,
        algorithms,
        cells,
    })
}

#[test]
fn pivots_records_into_grid() {
    let records = vec![
        BenchmarkRecord::new("D2", "B", 0.9),
        BenchmarkRecord::new("D1", "A", 0.5),
        BenchmarkRecord::new("D1", "B", -1.0),
        BenchmarkRecord::new("D2", "A", 1.2),
    ];
    let matrix = build(&records).unwrap();
    assert_eq!(matrix.shape(), (2, 2));
    assert_eq!(matrix.datasets, vec!["D1", "D2"]);
    assert_eq!(matrix.algorithms, vec!["A", "B"]);
    assert_eq!(
        matrix.cells,
        vec![vec![Some(0.5), Some(-1.0)], vec![Some(1.2), Some(0.9)]]
    );
}

#[test]
fn missing_pairs_are_absent_not_zero() {
    let records = vec![
        BenchmarkRecord::new("1", "A", 0.0),
        BenchmarkRecord::new("2", "B", 3.0),
    ];
    let matrix = build(&records).unwrap();
    assert_eq!(matrix.get(0, 0), Some(0.0));
    assert_eq!(matrix.get(0, 1), None);
    assert_eq!(matrix.get(1, 0), None);
    assert_eq!(matrix.get(1, 1), Some(3.0));
}

#[test]
fn duplicate_pair_fails() {
    let records = vec![
        BenchmarkRecord::new("D1", "A", 0.5),
        BenchmarkRecord::new("D1", "A", 0.7),
    ];
    match build(&records) {
        Err(ChartError::DuplicateKey { dataset, algorithm }) => {
            assert_eq!(dataset, "D1");
            assert_eq!(algorithm, "A");
        }
        other => panic!("expected duplicate key error, got {:?}", other),
    }
}

#[test]
fn empty_input_fails() {
    assert!(matches!(build(&[]), Err(ChartError::EmptyInput)));
}

#[test]
fn numeric_dataset_rows_keep_natural_order() {
    let records: Vec<BenchmarkRecord> = (1..=10)
        .rev()
        .map(|i| BenchmarkRecord::new(&i.to_string(), "ILP", i as f64))
        .collect();
    let matrix = build(&records).unwrap();
    let expected: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
    assert_eq!(matrix.datasets, expected);
    assert_eq!(matrix.get(9, 0), Some(10.0));
}

#[test]
fn non_finite_times_are_rejected() {
    for bad in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let records = vec![
            BenchmarkRecord::new("D1", "A", 0.5),
            BenchmarkRecord::new("D1", "B", bad),
        ];
        match build(&records) {
            Err(ChartError::InvalidRecord { dataset, algorithm, .. }) => {
                assert_eq!(dataset, "D1");
                assert_eq!(algorithm, "B");
            }
            other => panic!("expected invalid record error, got {:?}", other),
        }
    }
}

#[test]
fn non_finite_times_from_csv_are_rejected() {
    let input = "Dataset,Algorithm,Time(sec)\nD1,A,0.5\nD1,B,inf\nD2,A,NaN\n";
    let records = crate::record::read_records(input.as_bytes()).unwrap();
    assert!(matches!(build(&records), Err(ChartError::InvalidRecord { .. })));
}
