use std::{error::Error, fs::File};

use bench_chart::{cli, record::write_records, runner::run_benchmarks};
use log::info;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let arguments = cli::runner_args(&cli::runner_command().get_matches())?;
    let records = run_benchmarks(&arguments.config)?;

    write_records(File::create(&arguments.output)?, &records)?;
    info!("{} results written to {}", records.len(), arguments.output.display());

    Ok(())
}
