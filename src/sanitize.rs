use crate::{matrix::ResultMatrix, timeout::TimeoutMask};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotCell {
    Value(f64),
    /// Timed out: never drawn as a bar, never part of the value extent.
    Missing,
    /// No run was recorded for the pair.
    Absent,
}

impl PlotCell {
    pub fn value(self) -> Option<f64> {
        match self {
            PlotCell::Value(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedMatrix {
    pub datasets: Vec<String>,
    pub algorithms: Vec<String>,
    pub cells: Vec<Vec<PlotCell>>,
}

impl SanitizedMatrix {
    pub fn shape(&self) -> (usize, usize) {
        (self.datasets.len(), self.algorithms.len())
    }

    /// All plottable values, row by row.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().flatten().filter_map(|cell| cell.value())
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&cell| cell == PlotCell::Missing).count()
    }

    pub fn absent_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&cell| cell == PlotCell::Absent).count()
    }
}

/// Replaces masked cells with [`PlotCell::Missing`]; everything else is
/// carried over unchanged.
pub fn sanitize(matrix: &ResultMatrix, mask: &TimeoutMask) -> SanitizedMatrix {
    let cells = matrix
        .cells
        .iter()
        .enumerate()
        .map(|(row, values)| {
            values
                .iter()
                .enumerate()
                .map(|(col, cell)| match cell {
                    _ if mask.is_timeout(row, col) => PlotCell::Missing,
                    Some(v) => PlotCell::Value(*v),
                    None => PlotCell::Absent,
                })
                .collect()
        })
        .collect();

    SanitizedMatrix {
        datasets: matrix.datasets.clone(),
        algorithms: matrix.algorithms.clone(),
        cells,
    }
}

#[cfg(test)]
use crate::{matrix::build, record::BenchmarkRecord, timeout::classify};

#[test]
fn missing_exactly_where_masked() {
    let records = vec![
        BenchmarkRecord::new("D1", "A", 0.5),
        BenchmarkRecord::new("D1", "B", -1.0),
        BenchmarkRecord::new("D2", "A", 1.2),
        BenchmarkRecord::new("D2", "B", 0.9),
        BenchmarkRecord::new("D3", "A", 0.0),
    ];
    let matrix = build(&records).unwrap();
    let mask = classify(&matrix);
    let sanitized = sanitize(&matrix, &mask);

    for (row, cells) in sanitized.cells.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let masked = mask.is_timeout(row, col);
            assert_eq!(*cell == PlotCell::Missing, masked);
            if !masked && matrix.get(row, col).is_some() {
                let v = cell.value().unwrap();
                assert!(v.is_finite());
            }
        }
    }
    assert_eq!(sanitized.cells[2][1], PlotCell::Absent);
    assert_eq!(sanitized.missing_count(), 2);
    assert_eq!(sanitized.absent_count(), 1);
}

#[test]
fn scenario_from_mixed_results() {
    let records = vec![
        BenchmarkRecord::new("D1", "A", 0.5),
        BenchmarkRecord::new("D1", "B", -1.0),
        BenchmarkRecord::new("D2", "A", 1.2),
        BenchmarkRecord::new("D2", "B", 0.9),
    ];
    let matrix = build(&records).unwrap();
    let sanitized = sanitize(&matrix, &classify(&matrix));
    assert_eq!(
        sanitized.cells,
        vec![
            vec![PlotCell::Value(0.5), PlotCell::Missing],
            vec![PlotCell::Value(1.2), PlotCell::Value(0.9)],
        ]
    );
    assert_eq!(sanitized.values().collect::<Vec<_>>(), vec![0.5, 1.2, 0.9]);
}
