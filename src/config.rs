use std::path::PathBuf;

use plotters::chart::SeriesLabelPosition;

use crate::error::ChartError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl LegendPlacement {
    pub fn parse(name: &str) -> Result<LegendPlacement, ChartError> {
        match name.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "upper-left" => Ok(LegendPlacement::UpperLeft),
            "upper-right" => Ok(LegendPlacement::UpperRight),
            "lower-left" => Ok(LegendPlacement::LowerLeft),
            "lower-right" => Ok(LegendPlacement::LowerRight),
            otherwise => Err(ChartError::InvalidConfig(format!(
                "{} is not a valid legend placement",
                otherwise
            ))),
        }
    }

    pub(crate) fn series_label_position(self) -> SeriesLabelPosition {
        match self {
            LegendPlacement::UpperLeft => SeriesLabelPosition::UpperLeft,
            LegendPlacement::UpperRight => SeriesLabelPosition::UpperRight,
            LegendPlacement::LowerLeft => SeriesLabelPosition::LowerLeft,
            LegendPlacement::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

pub const DEFAULT_OUTPUT: &str = "benchmark_grouped_bar.png";
pub const DEFAULT_GLYPH: &str = "∅";
pub const DEFAULT_TITLE: &str = "Algorithm Performance Comparison";
pub const DEFAULT_X_LABEL: &str = "Dataset Number";
pub const DEFAULT_Y_LABEL: &str = "Execution Time (seconds, log scale)";
pub const DEFAULT_LEGEND_TITLE: &str = "Algorithm";

/// Everything that shapes the chart besides the data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Share of the unit interval one dataset's bars occupy.
    pub group_width: f64,
    pub log_scale: bool,
    pub timeout_glyph: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub legend_placement: LegendPlacement,
    pub size: (u32, u32),
    pub output: PathBuf,
}

impl Default for ChartConfig {
    fn default() -> ChartConfig {
        ChartConfig {
            group_width: 0.8,
            log_scale: true,
            timeout_glyph: DEFAULT_GLYPH.to_string(),
            title: DEFAULT_TITLE.to_string(),
            x_label: DEFAULT_X_LABEL.to_string(),
            y_label: DEFAULT_Y_LABEL.to_string(),
            legend_title: DEFAULT_LEGEND_TITLE.to_string(),
            legend_placement: LegendPlacement::UpperRight,
            size: (1200, 600),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl ChartConfig {
    pub fn validate(&self) -> Result<(), ChartError> {
        if !(self.group_width > 0.0 && self.group_width <= 1.0) {
            return Err(ChartError::InvalidConfig(format!(
                "group width must be in (0, 1], got {}",
                self.group_width
            )));
        }
        if self.timeout_glyph.trim().is_empty() {
            return Err(ChartError::InvalidConfig(
                "timeout glyph must not be empty".to_string(),
            ));
        }
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(ChartError::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                self.size.0, self.size.1
            )));
        }
        Ok(())
    }

    /// `y_label` with the log-scale suffix removed for linear charts.
    pub fn effective_y_label(&self) -> String {
        if self.log_scale {
            self.y_label.clone()
        } else {
            self.y_label.replace(", log scale", "")
        }
    }
}

#[test]
fn defaults_are_valid() {
    let config = ChartConfig::default();
    assert_eq!(config.group_width, 0.8);
    assert!(config.log_scale);
    assert_eq!(config.timeout_glyph, "∅");
    assert!(config.validate().is_ok());
}

#[test]
fn rejects_bad_group_width() {
    for width in [0.0, -0.3, 1.5, f64::NAN] {
        let config = ChartConfig {
            group_width: width,
            ..ChartConfig::default()
        };
        assert!(matches!(config.validate(), Err(ChartError::InvalidConfig(_))));
    }
}

#[test]
fn rejects_blank_glyph_and_empty_image() {
    let config = ChartConfig {
        timeout_glyph: " ".to_string(),
        ..ChartConfig::default()
    };
    assert!(config.validate().is_err());
    let config = ChartConfig {
        size: (0, 600),
        ..ChartConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn legend_placement_names() {
    assert_eq!(LegendPlacement::parse("upper-left").unwrap(), LegendPlacement::UpperLeft);
    assert_eq!(LegendPlacement::parse("Lower_Right").unwrap(), LegendPlacement::LowerRight);
    assert!(LegendPlacement::parse("middle").is_err());
}

#[test]
fn linear_label_drops_log_suffix() {
    let config = ChartConfig {
        log_scale: false,
        ..ChartConfig::default()
    };
    assert_eq!(config.effective_y_label(), "Execution Time (seconds)");
}
