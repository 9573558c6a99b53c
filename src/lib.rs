pub mod baseline;
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod runner;
pub mod sanitize;
pub mod timeout;

pub use config::ChartConfig;
pub use error::ChartError;
pub use pipeline::{render_csv, render_records, RenderSummary};
pub use record::BenchmarkRecord;
