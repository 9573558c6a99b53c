use std::{path::PathBuf, time::Duration};

use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::{
    config::{
        ChartConfig, LegendPlacement, DEFAULT_GLYPH, DEFAULT_LEGEND_TITLE, DEFAULT_OUTPUT,
        DEFAULT_TITLE, DEFAULT_X_LABEL, DEFAULT_Y_LABEL,
    },
    error::ChartError,
    runner::{AlgorithmSpec, RunnerConfig},
};

#[derive(Debug)]
pub struct ChartArgs {
    pub input: PathBuf,
    pub config: ChartConfig,
    pub flamegraph: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunnerArgs {
    pub config: RunnerConfig,
    pub output: PathBuf,
}

pub fn chart_command() -> Command {
    command!("benchchart")
        .about("Draws a grouped, log-scale bar chart of benchmark timings and marks runs that timed out.")
        .arg(
            Arg::new("input")
                .help("CSV file with Dataset, Algorithm and Time(sec) columns")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Image to write; .svg selects the SVG backend")
                .long("output")
                .short('o')
                .default_value(DEFAULT_OUTPUT),
        )
        .arg(
            Arg::new("group_width")
                .help("Share of each dataset slot taken up by its bars")
                .long("group-width")
                .short('w')
                .value_parser(value_parser!(f64))
                .default_value("0.8"),
        )
        .arg(
            Arg::new("linear")
                .help("Use a linear instead of a logarithmic y axis")
                .long("linear")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("glyph")
                .help("Marker drawn for runs that did not finish")
                .long("glyph")
                .default_value(DEFAULT_GLYPH),
        )
        .arg(Arg::new("title").long("title").default_value(DEFAULT_TITLE))
        .arg(Arg::new("x_label").long("x-label").default_value(DEFAULT_X_LABEL))
        .arg(Arg::new("y_label").long("y-label").default_value(DEFAULT_Y_LABEL))
        .arg(Arg::new("legend_title").long("legend-title").default_value(DEFAULT_LEGEND_TITLE))
        .arg(
            Arg::new("legend")
                .help("Legend corner: upper-left, upper-right, lower-left or lower-right")
                .long("legend")
                .default_value("upper-right"),
        )
        .arg(
            Arg::new("width")
                .long("width")
                .value_parser(value_parser!(u32))
                .default_value("1200"),
        )
        .arg(
            Arg::new("height")
                .long("height")
                .value_parser(value_parser!(u32))
                .default_value("600"),
        )
        .arg(
            Arg::new("flamegraph")
                .help("Write an HTML flame graph of the run to this path")
                .long("flamegraph")
                .short('f'),
        )
}

pub fn chart_args(matches: &ArgMatches) -> Result<ChartArgs, ChartError> {
    let input = match matches.get_one::<String>("input") {
        Some(path) => PathBuf::from(path),
        None => return Err(ChartError::InvalidConfig("input is required".to_string())),
    };

    let string = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
    let config = ChartConfig {
        group_width: matches.get_one::<f64>("group_width").copied().unwrap_or(0.8),
        log_scale: !matches.get_flag("linear"),
        timeout_glyph: string("glyph"),
        title: string("title"),
        x_label: string("x_label"),
        y_label: string("y_label"),
        legend_title: string("legend_title"),
        legend_placement: LegendPlacement::parse(&string("legend"))?,
        size: (
            matches.get_one::<u32>("width").copied().unwrap_or(1200),
            matches.get_one::<u32>("height").copied().unwrap_or(600),
        ),
        output: PathBuf::from(string("output")),
    };
    config.validate()?;

    Ok(ChartArgs {
        input,
        config,
        flamegraph: matches.get_one::<String>("flamegraph").map(PathBuf::from),
    })
}

pub fn runner_command() -> Command {
    command!("runbench")
        .about("Times every algorithm on every dataset file and records -1 for runs over budget.")
        .arg(
            Arg::new("datasets")
                .help("Glob pattern matching the dataset files, e.g. 'data/Pallets_*.csv'")
                .long("datasets")
                .short('d')
                .required(true),
        )
        .arg(
            Arg::new("algorithm")
                .help("Algorithm as NAME=COMMAND; the dataset path is appended to COMMAND")
                .long("algorithm")
                .short('a')
                .required(true)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("timeout")
                .help("Time budget per run in seconds")
                .long("timeout")
                .short('t')
                .value_parser(value_parser!(f64))
                .default_value("2.0"),
        )
        .arg(
            Arg::new("jobs")
                .help("Number of runs executed in parallel")
                .long("jobs")
                .short('j')
                .value_parser(value_parser!(usize))
                .default_value("1"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .default_value("benchmark.csv"),
        )
}

pub fn runner_args(matches: &ArgMatches) -> Result<RunnerArgs, ChartError> {
    let pattern = matches
        .get_one::<String>("datasets")
        .cloned()
        .ok_or_else(|| ChartError::InvalidConfig("dataset pattern is required".to_string()))?;

    let algorithms = matches
        .get_many::<String>("algorithm")
        .into_iter()
        .flatten()
        .map(|spec| AlgorithmSpec::parse(spec))
        .collect::<Result<Vec<_>, _>>()?;

    let timeout = matches.get_one::<f64>("timeout").copied().unwrap_or(2.0);
    if !(timeout > 0.0 && timeout.is_finite()) {
        return Err(ChartError::InvalidConfig(format!(
            "timeout must be a positive number of seconds, got {}",
            timeout
        )));
    }

    let jobs = matches.get_one::<usize>("jobs").copied().unwrap_or(1).max(1);
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("benchmark.csv"));

    Ok(RunnerArgs {
        config: RunnerConfig {
            pattern,
            algorithms,
            timeout: Duration::from_secs_f64(timeout),
            jobs,
        },
        output,
    })
}

#[test]
fn chart_defaults() {
    let matches = chart_command().try_get_matches_from(["benchchart", "benchmark.csv"]).unwrap();
    let args = chart_args(&matches).unwrap();
    assert_eq!(args.input, PathBuf::from("benchmark.csv"));
    assert_eq!(args.config, ChartConfig::default());
    assert!(args.flamegraph.is_none());
}

#[test]
fn chart_overrides() {
    let matches = chart_command()
        .try_get_matches_from([
            "benchchart",
            "results.csv",
            "-o",
            "out.svg",
            "--group-width",
            "0.6",
            "--linear",
            "--glyph",
            "TO",
            "--legend",
            "upper-left",
            "-f",
            "flame.html",
        ])
        .unwrap();
    let args = chart_args(&matches).unwrap();
    assert_eq!(args.config.output, PathBuf::from("out.svg"));
    assert_eq!(args.config.group_width, 0.6);
    assert!(!args.config.log_scale);
    assert_eq!(args.config.timeout_glyph, "TO");
    assert_eq!(args.config.legend_placement, LegendPlacement::UpperLeft);
    assert_eq!(args.flamegraph, Some(PathBuf::from("flame.html")));
}

#[test]
fn chart_rejects_invalid_width() {
    let matches = chart_command()
        .try_get_matches_from(["benchchart", "results.csv", "--group-width", "1.5"])
        .unwrap();
    assert!(matches!(chart_args(&matches), Err(ChartError::InvalidConfig(_))));
}

#[test]
fn runner_collects_algorithms() {
    let matches = runner_command()
        .try_get_matches_from([
            "runbench",
            "-d",
            "data/*.csv",
            "-a",
            "Greedy=./solve --greedy",
            "-a",
            "DP=./solve --dp",
            "-t",
            "0.5",
        ])
        .unwrap();
    let args = runner_args(&matches).unwrap();
    assert_eq!(args.config.pattern, "data/*.csv");
    assert_eq!(args.config.algorithms.len(), 2);
    assert_eq!(args.config.algorithms[1].name, "DP");
    assert_eq!(args.config.timeout, Duration::from_millis(500));
    assert_eq!(args.config.jobs, 1);
    assert_eq!(args.output, PathBuf::from("benchmark.csv"));
}

#[test]
fn runner_rejects_bad_timeout() {
    let matches = runner_command()
        .try_get_matches_from(["runbench", "-d", "*.csv", "-a", "A=true", "-t", "0"])
        .unwrap();
    assert!(runner_args(&matches).is_err());
}
