//! Timeseries: step records with cumulative and lead-time columns.

use jiff::{SignedDuration, civil::DateTime};
use serde::Serialize;

/// A single row of the derived table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeseriesRow {
    pub step: u32,
    pub elapsed_seconds: f64,

    /// Running sum of `elapsed_seconds` up to and including this row.
    pub cumulative_time: f64,

    /// Duration from cycle start to the state this step represents.
    ///
    /// `None` when the log has no timestamps and no step duration was given.
    pub forecast_lead_time: Option<SignedDuration>,

    /// `forecast_lead_time` in fractional hours.
    pub forecast_hour: Option<f64>,

    pub valid_time: Option<DateTime>,
}

/// The derived table for one log file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeseries {
    /// Cycle start the lead times are measured from, when one was known.
    pub start_time: Option<DateTime>,

    pub rows: Vec<TimeseriesRow>,
}

impl Timeseries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The most recent row, i.e. how far the model has got.
    pub fn last(&self) -> Option<&TimeseriesRow> {
        self.rows.last()
    }

    /// Total seconds accounted for so far.
    pub fn total_seconds(&self) -> f64 {
        self.last().map_or(0.0, |row| row.cumulative_time)
    }
}
