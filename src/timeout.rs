use crate::matrix::ResultMatrix;

/// `true` where a recorded time is the "did not finish" sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutMask {
    pub cells: Vec<Vec<bool>>,
}

impl TimeoutMask {
    pub fn is_timeout(&self, row: usize, col: usize) -> bool {
        self.cells.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&masked| masked).count()
    }
}

pub fn is_sentinel(time_seconds: f64) -> bool {
    time_seconds <= 0.0
}

/// Masks every present cell whose value is `<= 0`. Absent cells stay unmasked.
pub fn classify(matrix: &ResultMatrix) -> TimeoutMask {
    let cells = matrix
        .cells
        .iter()
        .map(|row| row.iter().map(|cell| cell.map_or(false, is_sentinel)).collect())
        .collect();
    TimeoutMask { cells }
}

#[cfg(test)]
fn matrix_of(cells: Vec<Vec<Option<f64>>>) -> ResultMatrix {
    ResultMatrix {
        datasets: (0..cells.len()).map(|i| format!("D{}", i + 1)).collect(),
        algorithms: (0..cells.first().map_or(0, |r| r.len()))
            .map(|j| format!("A{}", j + 1))
            .collect(),
        cells,
    }
}

#[test]
fn marks_non_positive_values() {
    let matrix = matrix_of(vec![
        vec![Some(0.5), Some(-1.0)],
        vec![Some(1.2), Some(0.9)],
    ]);
    let mask = classify(&matrix);
    assert_eq!(mask.cells, vec![vec![false, true], vec![false, false]]);
    assert_eq!(mask.count(), 1);
}

#[test]
fn zero_is_a_timeout_but_absent_is_not() {
    let matrix = matrix_of(vec![vec![Some(0.0), None, Some(f64::MIN_POSITIVE)]]);
    let mask = classify(&matrix);
    assert_eq!(mask.cells, vec![vec![true, false, false]]);
    assert!(mask.is_timeout(0, 0));
    assert!(!mask.is_timeout(0, 1));
    assert!(!mask.is_timeout(5, 5));
}
