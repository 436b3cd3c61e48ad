//! CLI interface for the log tool.
//!
//! Every subcommand reads one model log and prints one result: the step
//! timeseries, output-write times, a fitted line, or a prediction report.
//! Logs are named with `--file` or looked up in the config catalog by
//! data type and `--start-time`.

mod format;
mod source;

use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use jiff::{SignedDuration, civil::DateTime};
use tracing::info;

use crate::config::Config;
use crate::model::{Model, Regressor, TimeKind, Timeseries};
use crate::parse::{self, StepGrammar};
use crate::timeseries::{TimeseriesOptions, build_timeseries};
use crate::{finder, predict, report};

use format::{format_model, format_output_times, format_prediction, format_timeseries};
use source::{LogArgs, parse_start_time};

/// Extract step timings from NWP model logs and predict run completion.
#[derive(Debug, Parser)]
#[command(name = "nwpc-log-tool", version, after_long_help = EXAMPLES_HELP)]
pub struct Cli {
    /// Config file. Defaults to `~/.nwpc-log-tool/config.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log more to stderr: `-v` for info, `-vv` for debug.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

const EXAMPLES_HELP: &str = r"Examples:
  nwpc-log-tool step-time grapes-gfs --file std.out_fcst --start-time 2020050200 --step-seconds 300
  nwpc-log-tool step-time grapes-meso --file fcst.1 --kind cpu --format json
  nwpc-log-tool fit grapes-meso-3km --start-time 2020042200 --at 36
  nwpc-log-tool predict grapes-gfs --start-time 2020050200 --step-seconds 300 --forecast-length 240
  nwpc-log-tool find grapes_tym/log/fcst_ecf_out --start-time 2020060700";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the per-step timeseries.
    StepTime {
        #[command(flatten)]
        log: LogArgs,

        #[command(flatten)]
        timing: TimingArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print time spent writing model output.
    ///
    /// Not available for GRAPES GFS, whose log doesn't report it.
    OutputTime {
        #[command(flatten)]
        log: LogArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Fit a line from step or forecast hour to cumulative time.
    Fit {
        #[command(flatten)]
        log: LogArgs,

        #[command(flatten)]
        timing: TimingArgs,

        /// Independent variable. Defaults to forecast hour when lead times are known.
        #[arg(long, value_enum)]
        regressor: Option<RegressorArg>,

        /// Predict cumulative time at these regressor values.
        #[arg(long)]
        at: Vec<f64>,
    },

    /// Predict total run time and print the report as JSON.
    Predict {
        #[command(flatten)]
        log: LogArgs,

        #[command(flatten)]
        timing: TimingArgs,

        /// Final forecast hour of the cycle, e.g. 240.
        #[arg(long)]
        forecast_length: i64,

        /// Hour being reported on. Defaults to the last hour reached in the log.
        #[arg(long)]
        forecast_hour: Option<i64>,

        /// Write the report to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Resolve a data type to a file path using the config catalog.
    Find {
        /// Data-type tag, e.g. `grapes_gfs_gmf/log/fcst_long_std_out`.
        data_type: String,

        /// Cycle start time, e.g. `2020050200`.
        #[arg(long, value_parser = parse_start_time)]
        start_time: DateTime,
    },
}

/// How step lines are turned into lead times.
#[derive(Debug, Args)]
pub struct TimingArgs {
    /// Model time step in seconds (`MODEL_DT`); lead time becomes step × this.
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    pub step_seconds: Option<i64>,

    /// Which seconds to read. Only GRAPES MESO lets you choose.
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,
}

impl TimingArgs {
    fn step_duration(&self) -> Option<SignedDuration> {
        self.step_seconds.map(SignedDuration::from_secs)
    }
}

/// CLI-facing model, mapped to the domain `Model`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModelArg {
    /// GRAPES GFS global model.
    GrapesGfs,
    /// GRAPES MESO 10km.
    GrapesMeso,
    /// GRAPES MESO 3km.
    #[value(name = "grapes-meso-3km")]
    GrapesMeso3km,
    /// GRAPES TYM typhoon model.
    GrapesTym,
}

impl ModelArg {
    fn to_domain(self) -> Model {
        match self {
            Self::GrapesGfs => Model::GrapesGfs,
            Self::GrapesMeso => Model::GrapesMeso,
            Self::GrapesMeso3km => Model::GrapesMeso3km,
            Self::GrapesTym => Model::GrapesTym,
        }
    }
}

/// CLI-facing timing kind, mapped to the domain `TimeKind`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Wall-clock seconds.
    Elapsed,
    /// Processor seconds.
    Cpu,
}

impl KindArg {
    fn to_domain(self) -> TimeKind {
        match self {
            Self::Elapsed => TimeKind::Elapsed,
            Self::Cpu => TimeKind::Cpu,
        }
    }
}

/// CLI-facing regressor, mapped to the domain `Regressor`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RegressorArg {
    /// Model step counter.
    Step,
    /// Lead time in hours.
    ForecastHour,
}

impl RegressorArg {
    fn to_domain(self) -> Regressor {
        match self {
            Self::Step => Regressor::Step,
            Self::ForecastHour => Regressor::ForecastHour,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for reading.
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Run the parsed command, returning an error message on failure.
pub fn run(cli: Cli, config: &Config) -> Result<(), String> {
    match cli.command {
        Command::StepTime {
            log,
            timing,
            format,
        } => cmd_step_time(config, &log, &timing, format),
        Command::OutputTime { log, format } => cmd_output_time(config, &log, format),
        Command::Fit {
            log,
            timing,
            regressor,
            at,
        } => cmd_fit(config, &log, &timing, regressor, &at),
        Command::Predict {
            log,
            timing,
            forecast_length,
            forecast_hour,
            out,
        } => cmd_predict(config, &log, &timing, forecast_length, forecast_hour, out),
        Command::Find {
            data_type,
            start_time,
        } => cmd_find(config, &data_type, start_time),
    }
}

/// Read the log named by `log` and build its timeseries.
fn load_timeseries(
    config: &Config,
    log: &LogArgs,
    timing: &TimingArgs,
) -> Result<Timeseries, String> {
    let grammar = StepGrammar::new(log.model(), timing.kind.map(KindArg::to_domain))
        .map_err(|e| e.to_string())?;
    let path = log.resolve_path(config)?;

    let records = parse::read_step_records(&path, &grammar).map_err(|e| e.to_string())?;

    let options = TimeseriesOptions {
        start_time: log.start_time,
        step_duration: timing.step_duration(),
    };
    build_timeseries(&records, &options).map_err(|e| e.to_string())
}

fn cmd_step_time(
    config: &Config,
    log: &LogArgs,
    timing: &TimingArgs,
    format: OutputFormat,
) -> Result<(), String> {
    let series = load_timeseries(config, log, timing)?;
    info!(
        rows = series.len(),
        total_seconds = series.total_seconds(),
        "step timeseries ready"
    );

    match format {
        OutputFormat::Table => println!("{}", format_timeseries(&series)),
        OutputFormat::Json => println!("{}", to_json(&series)?),
    }
    Ok(())
}

fn cmd_output_time(config: &Config, log: &LogArgs, format: OutputFormat) -> Result<(), String> {
    let model = log.model();
    if !model.reports_output_time() {
        return Err(format!("{model} logs don't report output time"));
    }

    let path = log.resolve_path(config)?;
    let records = parse::read_output_times(&path).map_err(|e| e.to_string())?;

    match format {
        OutputFormat::Table => println!("{}", format_output_times(&records)),
        OutputFormat::Json => println!("{}", to_json(&records)?),
    }
    Ok(())
}

fn cmd_fit(
    config: &Config,
    log: &LogArgs,
    timing: &TimingArgs,
    regressor: Option<RegressorArg>,
    at: &[f64],
) -> Result<(), String> {
    let series = load_timeseries(config, log, timing)?;

    let regressor = regressor.map_or_else(
        || default_regressor(log.model(), timing),
        RegressorArg::to_domain,
    );
    let model = predict::fit(&series, regressor).map_err(|e| e.to_string())?;

    println!("{}", format_model(&model));
    for &x in at {
        println!("{}", format_prediction(&model, x));
    }
    Ok(())
}

fn cmd_predict(
    config: &Config,
    log: &LogArgs,
    timing: &TimingArgs,
    forecast_length: i64,
    forecast_hour: Option<i64>,
    out: Option<PathBuf>,
) -> Result<(), String> {
    let series = load_timeseries(config, log, timing)?;
    let model = predict::fit(&series, Regressor::ForecastHour).map_err(|e| e.to_string())?;

    let current = series.last().ok_or("log has no timing lines")?;
    let start_time = series
        .start_time
        .ok_or_else(|| missing_start_time(timing))?;
    let forecast_hour = match forecast_hour {
        Some(h) => h,
        None => reached_hour(current.forecast_hour)?,
    };

    let report = report::build_report(start_time, forecast_hour, forecast_length, current, &model)
        .map_err(|e| e.to_string())?;
    let json = to_json(&report)?;

    match out {
        Some(path) => {
            fs::write(&path, &json)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!(
                "Predicted {:.1} min for {}h → {}",
                report.predict.total.ctime,
                forecast_length,
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_find(config: &Config, data_type: &str, start_time: DateTime) -> Result<(), String> {
    let path = finder::find_local_file(config, data_type, start_time)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| {
            format!(
                "no {data_type} file found for cycle {}",
                start_time.strftime("%Y%m%d%H")
            )
        })?;
    println!("{}", path.display());
    Ok(())
}

/// Forecast hour when the log carries lead times, step otherwise.
fn default_regressor(model: Model, timing: &TimingArgs) -> Regressor {
    if model.has_valid_time() || timing.step_seconds.is_some() {
        Regressor::ForecastHour
    } else {
        Regressor::Step
    }
}

fn missing_start_time(timing: &TimingArgs) -> String {
    if timing.step_seconds.is_some() {
        "predict needs --start-time when --step-seconds is given".to_string()
    } else {
        "predict needs --start-time for logs without valid times".to_string()
    }
}

/// Whole hours reached by the latest row.
fn reached_hour(forecast_hour: Option<f64>) -> Result<i64, String> {
    let hour = forecast_hour.ok_or("latest row has no forecast hour")?;
    #[allow(clippy::cast_possible_truncation)]
    let whole = hour.floor() as i64;
    Ok(whole)
}

fn to_json(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize output: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn timing(step_seconds: Option<i64>, kind: Option<KindArg>) -> TimingArgs {
        TimingArgs { step_seconds, kind }
    }

    fn log_args(model: ModelArg, file: PathBuf, start_time: Option<DateTime>) -> LogArgs {
        LogArgs {
            model,
            file: Some(file),
            data_type: None,
            start_time,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_step_time_arguments() {
        let cli = Cli::try_parse_from([
            "nwpc-log-tool",
            "step-time",
            "grapes-meso-3km",
            "--file",
            "fcst.1",
            "--start-time",
            "2020042200",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::StepTime { log, format, .. } = cli.command else {
            panic!("expected step-time");
        };
        assert_eq!(log.model(), Model::GrapesMeso3km);
        assert_eq!(log.file, Some(PathBuf::from("fcst.1")));
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn file_and_data_type_conflict() {
        let result = Cli::try_parse_from([
            "nwpc-log-tool",
            "step-time",
            "grapes-gfs",
            "--file",
            "a",
            "--data-type",
            "b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn step_seconds_must_be_positive() {
        let result = Cli::try_parse_from([
            "nwpc-log-tool",
            "fit",
            "grapes-gfs",
            "--file",
            "a",
            "--step-seconds",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn default_regressor_follows_available_lead_time() {
        assert_eq!(
            default_regressor(Model::GrapesGfs, &timing(None, None)),
            Regressor::Step
        );
        assert_eq!(
            default_regressor(Model::GrapesGfs, &timing(Some(300), None)),
            Regressor::ForecastHour
        );
        assert_eq!(
            default_regressor(Model::GrapesTym, &timing(None, None)),
            Regressor::ForecastHour
        );
    }

    #[test]
    fn reached_hour_floors() {
        assert_eq!(reached_hour(Some(59.99)).unwrap(), 59);
        assert_eq!(reached_hour(Some(60.0)).unwrap(), 60);
        assert!(reached_hour(None).is_err());
    }

    #[test]
    fn load_timeseries_reads_a_gfs_log() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("std.out");
        fs::write(
            &path,
            "Timing for processing for step        1:   15.51460 elapsed seconds.\n\
             noise\n\
             Timing for processing for step        2:    0.30060 elapsed seconds.\n",
        )
        .unwrap();

        let log = log_args(ModelArg::GrapesGfs, path, parse_start_time("2020050200").ok());
        let series = load_timeseries(&Config::default(), &log, &timing(Some(300), None)).unwrap();

        assert_eq!(series.len(), 2);
        assert!((series.total_seconds() - 15.8152).abs() < 1e-9);
        assert_eq!(
            series.rows[1].valid_time,
            parse_start_time("2020050200")
                .ok()
                .map(|t| t.checked_add(SignedDuration::from_mins(10)).unwrap())
        );
    }

    #[test]
    fn load_timeseries_rejects_kind_for_fixed_models() {
        let log = log_args(ModelArg::GrapesTym, PathBuf::from("unused"), None);
        let err = load_timeseries(
            &Config::default(),
            &log,
            &timing(None, Some(KindArg::Elapsed)),
        )
        .unwrap_err();
        assert!(err.contains("grapes-tym"));
    }

    #[test]
    fn output_time_is_refused_for_gfs() {
        let log = log_args(ModelArg::GrapesGfs, PathBuf::from("unused"), None);
        let err = cmd_output_time(&Config::default(), &log, OutputFormat::Table).unwrap_err();
        assert!(err.contains("don't report output time"));
    }

    #[test]
    fn predict_with_step_seconds_asks_for_start_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fcst.1");
        fs::write(
            &path,
            "Timing for processing for step 1 (2020050900:00:30):  10.00000 elapsed seconds.\n\
             Timing for processing for step 2 (2020050900:01:00):  10.00000 elapsed seconds.\n",
        )
        .unwrap();

        let log = log_args(ModelArg::GrapesMeso, path, None);
        let err = cmd_predict(
            &Config::default(),
            &log,
            &timing(Some(30), None),
            24,
            None,
            None,
        )
        .unwrap_err();
        assert_eq!(err, "predict needs --start-time when --step-seconds is given");
    }

    #[test]
    fn predict_writes_report_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fcst.1");
        fs::write(
            &path,
            "Timing for processing for step 1 (2020050900:00:00):  10.00000 elapsed seconds.\n\
             Timing for processing for step 2 (2020050900:30:00):  10.00000 elapsed seconds.\n\
             Timing for processing for step 3 (2020050901:00:00):  10.00000 elapsed seconds.\n",
        )
        .unwrap();
        let out = dir.path().join("report.json");

        let log = log_args(ModelArg::GrapesMeso, path, None);
        cmd_predict(
            &Config::default(),
            &log,
            &timing(None, None),
            24,
            None,
            Some(out.clone()),
        )
        .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["start_time"], "2020-05-09T00:00:00");
        assert_eq!(json["request"]["forecast_time"], "1h");
        assert_eq!(json["predict"]["total"]["forecast_time"], "24h");
        // 20 s per hour from 10 s at hour 0: (20 * 24 + 10) / 60 minutes.
        let minutes = json["predict"]["total"]["ctime"].as_f64().unwrap();
        assert!((minutes - 490.0 / 60.0).abs() < 1e-9);
    }
}
