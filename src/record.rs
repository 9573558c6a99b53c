//! Record source: the flat `(dataset, algorithm, time)` rows a benchmark run
//! produces, read from and written to CSV.

use std::{cmp::Ordering, io, path::Path};

use csv::{ReaderBuilder, Trim, Writer};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// Time value written for a run that exceeded its budget or failed.
pub const TIMEOUT_SENTINEL: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    #[serde(rename = "Algorithm")]
    pub algorithm: String,
    #[serde(rename = "Dataset")]
    pub dataset: String,
    #[serde(rename = "Time(sec)")]
    pub time_seconds: f64,
}

impl BenchmarkRecord {
    pub fn new(dataset: &str, algorithm: &str, time_seconds: f64) -> BenchmarkRecord {
        BenchmarkRecord {
            algorithm: algorithm.to_string(),
            dataset: dataset.to_string(),
            time_seconds,
        }
    }
}

/// Reads records from any CSV source with a `Dataset`, `Algorithm`, `Time(sec)`
/// header. Column order does not matter.
pub fn read_records<R: io::Read>(source: R) -> Result<Vec<BenchmarkRecord>, ChartError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(source);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: BenchmarkRecord = result?;
        records.push(record);
    }
    debug!("read {} benchmark records", records.len());
    Ok(records)
}

pub fn read_records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<BenchmarkRecord>, ChartError> {
    let file = std::fs::File::open(path.as_ref())?;
    read_records(file)
}

pub fn write_records<W: io::Write>(sink: W, records: &[BenchmarkRecord]) -> Result<(), ChartError> {
    let mut wtr = Writer::from_writer(sink);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Orders dataset identifiers numerically when both parse as numbers, so that
/// `2` sorts before `10`. Numeric identifiers come before all others, which
/// keep plain string order.
pub fn dataset_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[test]
fn reads_columns_in_any_order() {
    let input = "Algorithm,Dataset,Time(sec)\nBacktracking, 1 ,0.25\nILP,1,-1\n";
    let records = read_records(input.as_bytes()).unwrap();
    assert_eq!(
        records,
        vec![
            BenchmarkRecord::new("1", "Backtracking", 0.25),
            BenchmarkRecord::new("1", "ILP", TIMEOUT_SENTINEL),
        ]
    );

    let swapped = "Time(sec),Dataset,Algorithm\n0.5,D1,A\n";
    let records = read_records(swapped.as_bytes()).unwrap();
    assert_eq!(records, vec![BenchmarkRecord::new("D1", "A", 0.5)]);
}

#[test]
fn unparsable_time_is_a_csv_error() {
    let input = "Dataset,Algorithm,Time(sec)\nD1,A,fast\n";
    assert!(matches!(read_records(input.as_bytes()), Err(ChartError::Csv(_))));
}

#[test]
fn writes_algorithm_first_layout() {
    let mut out = Vec::new();
    write_records(&mut out, &[BenchmarkRecord::new("3", "Dynamic Programming", -1.0)]).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text, "Algorithm,Dataset,Time(sec)\nDynamic Programming,3,-1.0\n");
}

#[test]
fn numeric_datasets_sort_naturally() {
    let mut ids = vec!["10", "2", "1", "D2", "D10"];
    ids.sort_by(|a, b| dataset_order(a, b));
    assert_eq!(ids, vec!["1", "2", "10", "D10", "D2"]);
}
