//! Raw records extracted from a log, before any derived columns.

use jiff::civil::DateTime;
use serde::Serialize;

/// One recognized timing line.
///
/// `step` is whatever the model printed: steps need not start at 1, be
/// contiguous, or be unique when a model restarts mid-log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step: u32,

    /// Seconds attributed to the step, of whichever kind was requested.
    pub elapsed_seconds: f64,

    /// Valid time printed beside the step, for models that print one.
    pub valid_time: Option<DateTime>,
}

/// Time spent writing model output, from an `output modelvar use` line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTimeRecord {
    pub seconds: f64,
}
