use std::path::Path;

use log::{info, warn};

use crate::{
    baseline::annotation_baseline,
    config::ChartConfig,
    error::ChartError,
    geometry::BarLayout,
    matrix,
    record::{read_records_from_path, BenchmarkRecord},
    render::{self, FileSurface, Surface},
    sanitize::sanitize,
    timeout::classify,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSummary {
    pub datasets: usize,
    pub algorithms: usize,
    pub bars: usize,
    pub timeouts: usize,
    pub absent: usize,
    pub baseline: f64,
}

/// Builds the chart for `records` and hands it to `surface`. All input
/// problems are reported before anything is drawn.
pub fn render_records<S: Surface>(
    records: &[BenchmarkRecord],
    config: &ChartConfig,
    surface: &mut S,
) -> Result<RenderSummary, ChartError> {
    config.validate()?;

    let span = flame::start_guard("pipeline");
    let matrix = matrix::build(records)?;
    let mask = classify(&matrix);
    let sanitized = sanitize(&matrix, &mask);

    let (groups, items) = sanitized.shape();
    if sanitized.values().next().is_none() {
        warn!("no run finished within its time budget, drawing timeout markers only");
    }

    let layout = BarLayout::new(groups, items, config.group_width);
    let baseline = annotation_baseline(&sanitized);
    let plan = render::plan(&sanitized, &mask, &layout, baseline, config);
    drop(span);

    let summary = RenderSummary {
        datasets: groups,
        algorithms: items,
        bars: plan.bars.len(),
        timeouts: mask.count(),
        absent: sanitized.absent_count(),
        baseline,
    };
    info!(
        "{} datasets, {} algorithms: {} bars, {} timeouts, {} missing runs",
        summary.datasets, summary.algorithms, summary.bars, summary.timeouts, summary.absent
    );

    surface.present(&plan, config)?;
    Ok(summary)
}

/// Reads a results CSV and writes the chart to `config.output`.
pub fn render_csv<P: AsRef<Path>>(input: P, config: &ChartConfig) -> Result<RenderSummary, ChartError> {
    let records = read_records_from_path(input)?;
    let mut surface = FileSurface::new(&config.output, config.size);
    render_records(&records, config, &mut surface)
}

#[cfg(test)]
use crate::render::ChartPlan;

#[cfg(test)]
#[derive(Default)]
struct RecordingSurface {
    plans: Vec<ChartPlan>,
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn present(&mut self, plan: &ChartPlan, _config: &ChartConfig) -> Result<(), ChartError> {
        self.plans.push(plan.clone());
        Ok(())
    }
}

#[cfg(test)]
struct FailingSurface;

#[cfg(test)]
impl Surface for FailingSurface {
    fn present(&mut self, _plan: &ChartPlan, _config: &ChartConfig) -> Result<(), ChartError> {
        Err(ChartError::Surface("disk full".to_string()))
    }
}

#[test]
fn mixed_results_summary() {
    let records = vec![
        BenchmarkRecord::new("D1", "A", 0.5),
        BenchmarkRecord::new("D1", "B", -1.0),
        BenchmarkRecord::new("D2", "A", 1.2),
        BenchmarkRecord::new("D2", "B", 0.9),
    ];
    let mut surface = RecordingSurface::default();
    let summary = render_records(&records, &ChartConfig::default(), &mut surface).unwrap();
    assert_eq!(
        summary,
        RenderSummary {
            datasets: 2,
            algorithms: 2,
            bars: 3,
            timeouts: 1,
            absent: 0,
            baseline: 0.25,
        }
    );
    assert_eq!(surface.plans.len(), 1);
}

#[test]
fn input_errors_stop_before_drawing() {
    let mut surface = RecordingSurface::default();
    let records = vec![
        BenchmarkRecord::new("D1", "A", 0.5),
        BenchmarkRecord::new("D1", "A", -1.0),
    ];
    assert!(matches!(
        render_records(&records, &ChartConfig::default(), &mut surface),
        Err(ChartError::DuplicateKey { .. })
    ));
    assert!(matches!(
        render_records(&[], &ChartConfig::default(), &mut surface),
        Err(ChartError::EmptyInput)
    ));
    let bad = ChartConfig {
        group_width: 2.0,
        ..ChartConfig::default()
    };
    assert!(render_records(&[BenchmarkRecord::new("1", "A", 1.0)], &bad, &mut surface).is_err());
    assert!(surface.plans.is_empty());
}

#[test]
fn surface_errors_propagate_unchanged() {
    let records = vec![BenchmarkRecord::new("1", "A", 2.0)];
    match render_records(&records, &ChartConfig::default(), &mut FailingSurface) {
        Err(ChartError::Surface(msg)) => assert_eq!(msg, "disk full"),
        other => panic!("expected surface error, got {:?}", other),
    }
}

#[test]
fn all_timeouts_still_render() {
    let records = vec![
        BenchmarkRecord::new("D1", "A", -1.0),
        BenchmarkRecord::new("D1", "B", -1.0),
        BenchmarkRecord::new("D2", "A", -1.0),
        BenchmarkRecord::new("D2", "B", -1.0),
    ];
    let mut surface = RecordingSurface::default();
    let summary = render_records(&records, &ChartConfig::default(), &mut surface).unwrap();
    assert_eq!(summary.bars, 0);
    assert_eq!(summary.timeouts, 4);
    assert_eq!(summary.baseline, 1e-3);
    assert_eq!(surface.plans[0].glyphs.len(), 4);
}
