//! Tool configuration.
//!
//! Loaded from `~/.nwpc-log-tool/config.toml` unless `--config` names
//! another file. The file is optional; without it only `--file` inputs work.
//!
//! ```toml
//! log-level = "info"
//!
//! [[data-types]]
//! name = "grapes_gfs_gmf/log/fcst_long_std_out"
//! paths = [
//!     "/g1/COMMONDATA/OPER/NWPC/GRAPES_GFS_GMF/Log/{time-3h:%Y%m%d%H}/std.out_fcst_{time:%Y%m%d%H}",
//! ]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Tool configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Default tracing filter, used when neither `RUST_LOG` nor `-v` is given.
    pub log_level: Option<String>,

    /// Catalog of log locations, looked up by data-type tag.
    #[serde(default)]
    pub data_types: Vec<DataType>,
}

/// Where files of one data type live, as path templates.
#[derive(Debug, Clone, Deserialize)]
pub struct DataType {
    /// Tag such as `grapes_meso_3km/log/fcst_ecf_out`.
    pub name: String,

    /// Candidate path templates, tried in order.
    pub paths: Vec<String>,
}

impl Config {
    /// Load config from `path`, or from the default location when `None`.
    ///
    /// A missing file at the default location yields an empty config; a
    /// missing file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::default());
            }
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        Self::parse(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Parse config from TOML text.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        let config: Self = toml::from_str(contents)?;
        Ok(config)
    }

    /// The default config file path: `~/.nwpc-log-tool/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".nwpc-log-tool").join("config.toml"))
    }

    /// Look up a data type by tag.
    pub fn data_type(&self, name: &str) -> Option<&DataType> {
        self.data_types.iter().find(|d| d.name == name)
    }
}
