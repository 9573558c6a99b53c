//! Grouped bar chart rendering.
//!
//! [`plan`] turns the sanitized matrix into plain drawing commands (bars,
//! timeout glyphs, axis extents); a [`Surface`] then draws that plan with
//! plotters and persists the image. Only the surface touches the filesystem.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::{
    config::ChartConfig,
    error::ChartError,
    geometry::BarLayout,
    sanitize::{PlotCell, SanitizedMatrix},
    timeout::TimeoutMask,
};

const TITLE_FONT_SIZE: u32 = 30;
const GLYPH_FONT_SIZE: u32 = 16;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub dataset: usize,
    pub series: usize,
    pub left: f64,
    pub right: f64,
    pub height: f64,
}

/// "Did not finish" marker, horizontally centred on `x` and anchored above `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub dataset: usize,
    pub series: usize,
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub datasets: Vec<String>,
    pub series: Vec<String>,
    pub bars: Vec<Bar>,
    pub glyphs: Vec<Glyph>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    /// Where bars start: the bottom of a log axis, zero on a linear one.
    pub bar_floor: f64,
    pub baseline: f64,
    pub log_scale: bool,
}

pub fn plan(
    sanitized: &SanitizedMatrix,
    mask: &TimeoutMask,
    layout: &BarLayout,
    baseline: f64,
    config: &ChartConfig,
) -> ChartPlan {
    let mut bars = Vec::new();
    let mut glyphs = Vec::new();

    for (dataset, row) in sanitized.cells.iter().enumerate() {
        for (series, cell) in row.iter().enumerate() {
            if mask.is_timeout(dataset, series) {
                glyphs.push(Glyph {
                    dataset,
                    series,
                    x: layout.x(dataset, series),
                    y: baseline,
                    text: config.timeout_glyph.clone(),
                });
            } else if let PlotCell::Value(height) = *cell {
                let (left, right) = layout.span(dataset, series);
                bars.push(Bar {
                    dataset,
                    series,
                    left,
                    right,
                    height,
                });
            }
        }
    }

    let y_range = value_extent(sanitized, baseline, !glyphs.is_empty(), config.log_scale);
    let bar_floor = if config.log_scale { y_range.0 } else { 0.0 };
    debug!(
        "chart plan: {} bars, {} timeout glyphs, y range {:?}",
        bars.len(),
        glyphs.len(),
        y_range
    );

    ChartPlan {
        datasets: sanitized.datasets.clone(),
        series: sanitized.algorithms.clone(),
        bars,
        glyphs,
        x_range: layout.x_range(),
        y_range,
        bar_floor,
        baseline,
        log_scale: config.log_scale,
    }
}

/// Vertical extent from plottable values only, widened to keep glyphs in view.
fn value_extent(sanitized: &SanitizedMatrix, baseline: f64, has_glyphs: bool, log_scale: bool) -> (f64, f64) {
    let min = sanitized.values().reduce(f64::min);
    let max = sanitized.values().reduce(f64::max);

    if log_scale {
        let floor = match min {
            Some(min) if has_glyphs => min.min(baseline),
            Some(min) => min,
            None => baseline,
        };
        let lo = floor * 0.5;
        let hi = match max {
            Some(max) if max * 2.0 > lo => max * 2.0,
            _ => lo * 100.0,
        };
        (lo, hi.min(f64::MAX))
    } else {
        let hi = match max {
            Some(max) if max > 0.0 => max * 1.1,
            _ => baseline * 10.0,
        };
        (0.0, hi.min(f64::MAX))
    }
}

/// The external side of rendering: consumes a finished plan.
pub trait Surface {
    fn present(&mut self, plan: &ChartPlan, config: &ChartConfig) -> Result<(), ChartError>;
}

/// Persists the chart as an image file. `.svg` paths get the SVG backend,
/// everything else the bitmap backend.
pub struct FileSurface {
    path: PathBuf,
    size: (u32, u32),
}

impl FileSurface {
    pub fn new<P: AsRef<Path>>(path: P, size: (u32, u32)) -> FileSurface {
        FileSurface {
            path: path.as_ref().to_path_buf(),
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_svg(&self) -> bool {
        self.path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("svg"))
    }

    fn present_svg(&self, plan: &ChartPlan, config: &ChartConfig) -> Result<(), ChartError> {
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, self.size).into_drawing_area();
            draw(&root, plan, config)?;
            root.present()?;
        }
        fs::write(&self.path, buffer)?;
        Ok(())
    }

    // The bitmap backend saves on drop, so draw into a sibling file and only
    // move it into place once everything succeeded.
    fn present_bitmap(&self, plan: &ChartPlan, config: &ChartConfig) -> Result<(), ChartError> {
        let partial = partial_path(&self.path);
        let outcome = (|| -> Result<(), ChartError> {
            let root = BitMapBackend::new(&partial, self.size).into_drawing_area();
            draw(&root, plan, config)?;
            root.present()?;
            Ok(())
        })();

        match outcome {
            Ok(()) => {
                fs::rename(&partial, &self.path)?;
                Ok(())
            }
            Err(err) => {
                let _ = fs::remove_file(&partial);
                Err(err)
            }
        }
    }
}

impl Surface for FileSurface {
    fn present(&mut self, plan: &ChartPlan, config: &ChartConfig) -> Result<(), ChartError> {
        flame::start("render::present");
        let result = if self.is_svg() {
            self.present_svg(plan, config)
        } else {
            self.present_bitmap(plan, config)
        };
        flame::end("render::present");
        result?;
        info!("chart written to {}", self.path.display());
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    let file_name = match path.extension() {
        Some(ext) => format!(".{}.partial.{}", stem, ext.to_string_lossy()),
        None => format!(".{}.partial", stem),
    };
    path.with_file_name(file_name)
}

/// Tick label with three significant digits; plain notation between 1e-3
/// and 1e4, scientific outside.
fn format_seconds(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let rounded: f64 = format!("{:.2e}", value).parse().unwrap_or(value);
    if (1e-3..1e4).contains(&rounded.abs()) {
        format!("{}", rounded)
    } else {
        format!("{:e}", rounded)
    }
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &ChartPlan,
    config: &ChartConfig,
) -> Result<(), ChartError> {
    let (lo, hi) = plan.y_range;
    if plan.log_scale {
        draw_chart(root, plan, config, (lo..hi).log_scale())
    } else {
        draw_chart(root, plan, config, lo..hi)
    }
}

fn draw_chart<DB, Y>(
    root: &DrawingArea<DB, Shift>,
    plan: &ChartPlan,
    config: &ChartConfig,
    y_spec: Y,
) -> Result<(), ChartError>
where
    DB: DrawingBackend,
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = plan.x_range;
    let mut chart = ChartBuilder::on(root)
        .caption(&config.title, ("sans-serif", TITLE_FONT_SIZE).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, y_spec)?;

    let datasets = &plan.datasets;
    let dataset_label = |x: &f64| {
        let idx = x.round();
        if idx >= 0.0 && (x - idx).abs() < 0.3 {
            datasets.get(idx as usize).cloned().unwrap_or_default()
        } else {
            String::new()
        }
    };
    let seconds_label = |y: &f64| format_seconds(*y);

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(datasets.len().max(1))
        .x_label_formatter(&dataset_label)
        .y_label_formatter(&seconds_label)
        .bold_line_style(BLACK.mix(0.25))
        .light_line_style(BLACK.mix(0.07))
        .x_desc(&config.x_label)
        .y_desc(config.effective_y_label())
        .draw()?;

    // Legend heading.
    chart
        .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())?
        .label(&config.legend_title)
        .legend(|(x, y)| Circle::new((x, y), 0, WHITE.filled()));

    for (series, name) in plan.series.iter().enumerate() {
        let color = Palette99::pick(series);
        chart
            .draw_series(plan.bars.iter().filter(|bar| bar.series == series).map(|bar| {
                Rectangle::new(
                    [(bar.left, plan.bar_floor), (bar.right, bar.height)],
                    color.filled(),
                )
            }))?
            .label(name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    if !plan.glyphs.is_empty() {
        let glyph_style = ("sans-serif", GLYPH_FONT_SIZE)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        let legend_glyph = config.timeout_glyph.clone();
        chart
            .draw_series(
                plan.glyphs
                    .iter()
                    .map(|glyph| Text::new(glyph.text.clone(), (glyph.x, glyph.y), glyph_style.clone())),
            )?
            .label(format!("{} = timeout", config.timeout_glyph))
            .legend(move |(x, y)| {
                Text::new(
                    legend_glyph.clone(),
                    (x + 6, y - 8),
                    ("sans-serif", GLYPH_FONT_SIZE).into_font(),
                )
            });
    }

    chart
        .configure_series_labels()
        .position(config.legend_placement.series_label_position())
        .background_style(WHITE.mix(0.85))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
use crate::{baseline::annotation_baseline, matrix::build, record::BenchmarkRecord, sanitize::sanitize, timeout::classify};

#[cfg(test)]
fn plan_for(records: &[BenchmarkRecord], config: &ChartConfig) -> ChartPlan {
    let matrix = build(records).unwrap();
    let mask = classify(&matrix);
    let sanitized = sanitize(&matrix, &mask);
    let (groups, items) = sanitized.shape();
    let layout = BarLayout::new(groups, items, config.group_width);
    let baseline = annotation_baseline(&sanitized);
    plan(&sanitized, &mask, &layout, baseline, config)
}

#[test]
fn one_glyph_over_the_timed_out_bar() {
    let records = vec![
        BenchmarkRecord::new("D1", "A", 0.5),
        BenchmarkRecord::new("D1", "B", -1.0),
        BenchmarkRecord::new("D2", "A", 1.2),
        BenchmarkRecord::new("D2", "B", 0.9),
    ];
    let config = ChartConfig::default();
    let plan = plan_for(&records, &config);

    assert_eq!(plan.bars.len(), 3);
    assert_eq!(plan.glyphs.len(), 1);
    let glyph = &plan.glyphs[0];
    assert_eq!((glyph.dataset, glyph.series), (0, 1));
    assert!((glyph.x - 0.2).abs() < 1e-12);
    assert_eq!(glyph.y, 0.25);
    assert_eq!(glyph.text, "∅");
    assert_eq!(plan.baseline, 0.25);

    // Real bar in the same slot of the other group lines up with the glyph.
    let bar = plan.bars.iter().find(|b| b.dataset == 1 && b.series == 1).unwrap();
    assert!(((bar.left + bar.right) / 2.0 - (glyph.x + 1.0)).abs() < 1e-12);
    assert!(plan.y_range.0 <= glyph.y && plan.bar_floor == plan.y_range.0);
    assert!(plan.y_range.1 >= 1.2);
}

#[test]
fn all_timeouts_draw_only_glyphs() {
    let records = vec![
        BenchmarkRecord::new("D1", "A", -1.0),
        BenchmarkRecord::new("D1", "B", -1.0),
        BenchmarkRecord::new("D2", "A", 0.0),
        BenchmarkRecord::new("D2", "B", -1.0),
    ];
    let plan = plan_for(&records, &ChartConfig::default());
    assert!(plan.bars.is_empty());
    assert_eq!(plan.glyphs.len(), 4);
    assert!(plan.glyphs.iter().all(|g| g.y == 1e-3));
    assert!(plan.y_range.0 < 1e-3 && plan.y_range.1 > 1e-3);
}

#[test]
fn single_bar_without_glyphs() {
    let records = vec![BenchmarkRecord::new("1", "ILP", 2.0)];
    let plan = plan_for(&records, &ChartConfig::default());
    assert!(plan.glyphs.is_empty());
    assert_eq!(plan.bars.len(), 1);
    let bar = &plan.bars[0];
    assert_eq!(bar.height, 2.0);
    assert!((bar.left - -0.4).abs() < 1e-12 && (bar.right - 0.4).abs() < 1e-12);
    assert_eq!(plan.y_range, (1.0, 4.0));
}

#[test]
fn absent_cells_draw_nothing() {
    let records = vec![
        BenchmarkRecord::new("1", "A", 1.0),
        BenchmarkRecord::new("2", "B", 2.0),
    ];
    let plan = plan_for(&records, &ChartConfig::default());
    assert_eq!(plan.bars.len(), 2);
    assert!(plan.glyphs.is_empty());
}

#[test]
fn linear_scale_starts_bars_at_zero() {
    let records = vec![
        BenchmarkRecord::new("1", "A", 1.0),
        BenchmarkRecord::new("1", "B", -1.0),
    ];
    let config = ChartConfig {
        log_scale: false,
        ..ChartConfig::default()
    };
    let plan = plan_for(&records, &config);
    assert_eq!(plan.bar_floor, 0.0);
    assert_eq!(plan.y_range.0, 0.0);
    assert!(plan.y_range.1 > 1.0);
    assert_eq!(plan.glyphs[0].y, 0.5);
}

#[test]
fn partial_file_sits_next_to_target() {
    assert_eq!(
        partial_path(Path::new("out/chart.png")),
        PathBuf::from("out/.chart.partial.png")
    );
    assert_eq!(partial_path(Path::new("chart")), PathBuf::from(".chart.partial"));
}

#[test]
fn huge_times_keep_a_finite_axis() {
    let records = vec![
        BenchmarkRecord::new("1", "A", 0.5),
        BenchmarkRecord::new("1", "B", 1e308),
    ];
    for log_scale in [true, false] {
        let config = ChartConfig {
            log_scale,
            ..ChartConfig::default()
        };
        let plan = plan_for(&records, &config);
        assert!(plan.y_range.0.is_finite() && plan.y_range.1.is_finite());
        assert!(plan.y_range.1 >= 1e308);
    }
}

#[test]
fn tick_labels_keep_significant_digits() {
    assert_eq!(format_seconds(0.25), "0.25");
    assert_eq!(format_seconds(1.0), "1");
    assert_eq!(format_seconds(0.1 + 0.2), "0.3");
    assert_eq!(format_seconds(0.0001), "1e-4");
    assert_eq!(format_seconds(0.00025), "2.5e-4");
    assert_eq!(format_seconds(12340.0), "1.23e4");
    assert_eq!(format_seconds(0.0), "0");
}
