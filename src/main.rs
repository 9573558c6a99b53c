use std::error::Error;

use bench_chart::{cli, pipeline};
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arguments = cli::chart_args(&cli::chart_command().get_matches())?;

    if arguments.flamegraph.is_some() {
        flame::start("main");
    }

    let summary = pipeline::render_csv(&arguments.input, &arguments.config)?;
    info!(
        "{} bars and {} timeout markers drawn, markers at y = {}",
        summary.bars, summary.timeouts, summary.baseline
    );

    if let Some(path) = &arguments.flamegraph {
        flame::end("main");
        flame::dump_html(std::fs::File::create(path)?)?;
    }

    Ok(())
}
