//! Log source arguments: which model, and which file to read.

use std::path::PathBuf;

use clap::Args;
use jiff::civil::DateTime;

use crate::{config::Config, finder, model::Model};

use super::ModelArg;

/// Which log to read.
///
/// Either `--file`, or a data-type lookup through the config catalog
/// for the cycle at `--start-time`.
#[derive(Debug, Args)]
pub struct LogArgs {
    /// Model that wrote the log.
    #[arg(value_enum)]
    pub model: ModelArg,

    /// Log file to read.
    #[arg(long, conflicts_with = "data_type")]
    pub file: Option<PathBuf>,

    /// Data-type tag to look up in the config (defaults to the model's forecast log).
    #[arg(long)]
    pub data_type: Option<String>,

    /// Cycle start time, e.g. `2020050200`.
    #[arg(long, value_parser = parse_start_time)]
    pub start_time: Option<DateTime>,
}

impl LogArgs {
    pub fn model(&self) -> Model {
        self.model.to_domain()
    }

    /// Resolve the log path, consulting the data finder when no file was given.
    pub fn resolve_path(&self, config: &Config) -> Result<PathBuf, String> {
        if let Some(path) = &self.file {
            return Ok(path.clone());
        }

        let data_type = self
            .data_type
            .as_deref()
            .unwrap_or_else(|| self.model().default_data_type());
        let start_time = self
            .start_time
            .ok_or("pass --file, or --start-time to look the log up in the config")?;

        finder::find_local_file(config, data_type, start_time)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| {
                format!(
                    "no {data_type} file found for cycle {}",
                    start_time.strftime("%Y%m%d%H")
                )
            })
    }
}

/// Parse a cycle start time in `YYYYMMDDHH` form.
pub fn parse_start_time(s: &str) -> Result<DateTime, String> {
    DateTime::strptime("%Y%m%d%H", s)
        .map_err(|e| format!("invalid start time {s:?}; expected YYYYMMDDHH ({e})"))
}
