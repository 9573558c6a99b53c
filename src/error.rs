use std::{error::Error, fmt, io};

use plotters::drawing::DrawingAreaErrorKind;

#[derive(Debug)]
pub enum ChartError {
    /// More than one record for the same (dataset, algorithm) pair.
    DuplicateKey { dataset: String, algorithm: String },
    EmptyInput,
    /// A time that is not a finite number.
    InvalidRecord { dataset: String, algorithm: String, time: f64 },
    InvalidConfig(String),
    Io(io::Error),
    Csv(csv::Error),
    /// The rendering surface failed to draw or persist the figure.
    Surface(String),
    Runner(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::DuplicateKey { dataset, algorithm } => write!(
                f,
                "duplicate record for dataset '{}' and algorithm '{}'",
                dataset, algorithm
            ),
            ChartError::EmptyInput => write!(f, "no benchmark records supplied"),
            ChartError::InvalidRecord {
                dataset,
                algorithm,
                time,
            } => write!(
                f,
                "time {} for dataset '{}' and algorithm '{}' is not a finite number",
                time, dataset, algorithm
            ),
            ChartError::InvalidConfig(msg) => write!(f, "invalid chart configuration: {}", msg),
            ChartError::Io(err) => write!(f, "i/o error: {}", err),
            ChartError::Csv(err) => write!(f, "csv error: {}", err),
            ChartError::Surface(msg) => write!(f, "rendering surface error: {}", msg),
            ChartError::Runner(msg) => write!(f, "benchmark runner error: {}", msg),
        }
    }
}

impl Error for ChartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChartError::Io(err) => Some(err),
            ChartError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ChartError {
    fn from(err: io::Error) -> ChartError {
        ChartError::Io(err)
    }
}

impl From<csv::Error> for ChartError {
    fn from(err: csv::Error) -> ChartError {
        ChartError::Csv(err)
    }
}

impl<E: Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(err: DrawingAreaErrorKind<E>) -> ChartError {
        ChartError::Surface(err.to_string())
    }
}

#[test]
fn duplicate_key_names_the_pair() {
    let err = ChartError::DuplicateKey {
        dataset: "D1".to_string(),
        algorithm: "Backtracking".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("'D1'"));
    assert!(msg.contains("'Backtracking'"));
}

#[test]
fn io_errors_keep_their_source() {
    let err: ChartError = io::Error::new(io::ErrorKind::NotFound, "missing.csv").into();
    assert!(err.source().is_some());
    assert!(err.to_string().contains("missing.csv"));
}
