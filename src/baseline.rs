use crate::sanitize::SanitizedMatrix;

/// Marker height used when there is no real value to sit beneath.
pub const FALLBACK_BASELINE: f64 = 1e-3;
pub const BASELINE_FRACTION: f64 = 0.5;

/// Y-coordinate for timeout glyphs: half of the smallest plotted value, so
/// they sit below every real bar on a log axis.
pub fn annotation_baseline(sanitized: &SanitizedMatrix) -> f64 {
    match sanitized.values().reduce(f64::min) {
        Some(min) if min > 0.0 => min * BASELINE_FRACTION,
        _ => FALLBACK_BASELINE,
    }
}

#[cfg(test)]
use crate::sanitize::PlotCell;

#[cfg(test)]
fn sanitized_of(cells: Vec<Vec<PlotCell>>) -> SanitizedMatrix {
    SanitizedMatrix {
        datasets: (0..cells.len()).map(|i| i.to_string()).collect(),
        algorithms: (0..cells.first().map_or(0, |r| r.len())).map(|j| j.to_string()).collect(),
        cells,
    }
}

#[test]
fn half_of_smallest_value() {
    let sanitized = sanitized_of(vec![
        vec![PlotCell::Value(0.5), PlotCell::Missing],
        vec![PlotCell::Value(1.2), PlotCell::Value(0.9)],
    ]);
    assert_eq!(annotation_baseline(&sanitized), 0.25);
}

#[test]
fn all_positive_values() {
    let sanitized = sanitized_of(vec![vec![
        PlotCell::Value(3.0),
        PlotCell::Value(0.004),
        PlotCell::Absent,
    ]]);
    assert_eq!(annotation_baseline(&sanitized), 0.002);
}

#[test]
fn all_timeouts_fall_back() {
    let sanitized = sanitized_of(vec![
        vec![PlotCell::Missing, PlotCell::Missing],
        vec![PlotCell::Missing, PlotCell::Missing],
    ]);
    assert_eq!(annotation_baseline(&sanitized), FALLBACK_BASELINE);
}

#[test]
fn only_absent_cells_fall_back() {
    let sanitized = sanitized_of(vec![vec![PlotCell::Absent]]);
    assert_eq!(annotation_baseline(&sanitized), FALLBACK_BASELINE);
}
