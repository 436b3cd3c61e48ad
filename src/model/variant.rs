//! Model variants and the timing kinds their logs report.

use std::fmt;

use serde::Serialize;

/// A forecast model family whose log format the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Model {
    /// GRAPES GFS global model. Step lines carry no timestamp.
    GrapesGfs,

    /// GRAPES MESO 10km regional model.
    GrapesMeso,

    /// GRAPES MESO 3km high-resolution regional model.
    GrapesMeso3km,

    /// GRAPES TYM typhoon model.
    GrapesTym,
}

impl Model {
    /// Data-type tag used to look up this model's forecast log in the catalog.
    pub fn default_data_type(self) -> &'static str {
        match self {
            Self::GrapesGfs => "grapes_gfs_gmf/log/fcst_long_std_out",
            Self::GrapesMeso => "grapes_meso_10km/log/fcst_ecf_out",
            Self::GrapesMeso3km => "grapes_meso_3km/log/fcst_ecf_out",
            Self::GrapesTym => "grapes_tym/log/fcst_ecf_out",
        }
    }

    /// Whether step lines embed the valid time of the step.
    pub fn has_valid_time(self) -> bool {
        !matches!(self, Self::GrapesGfs)
    }

    /// Whether the log reports `output modelvar use ... seconds` lines.
    pub fn reports_output_time(self) -> bool {
        self.has_valid_time()
    }

    /// The timing kind used when the caller does not ask for one.
    ///
    /// TYM's elapsed figures are unreliable, so it always reads cpu seconds.
    pub fn default_kind(self) -> TimeKind {
        match self {
            Self::GrapesTym => TimeKind::Cpu,
            Self::GrapesGfs | Self::GrapesMeso | Self::GrapesMeso3km => TimeKind::Elapsed,
        }
    }

    /// Whether the caller may pick a timing kind other than the default.
    pub fn kind_selectable(self) -> bool {
        matches!(self, Self::GrapesMeso)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::GrapesGfs => "grapes-gfs",
            Self::GrapesMeso => "grapes-meso",
            Self::GrapesMeso3km => "grapes-meso-3km",
            Self::GrapesTym => "grapes-tym",
        };
        f.write_str(name)
    }
}

/// Which per-step figure a timing line reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeKind {
    /// Wall-clock seconds.
    Elapsed,

    /// Processor seconds.
    Cpu,
}

impl TimeKind {
    /// The trailing word before `seconds.` in a timing line.
    pub fn label(self) -> &'static str {
        match self {
            Self::Elapsed => "elapsed",
            Self::Cpu => "cpu",
        }
    }
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
