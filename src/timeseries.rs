//! Timeseries building: derive cumulative and lead-time columns from raw
//! step records.
//!
//! Lead time comes from one of two places, in this order:
//!
//! 1. A fixed step duration: `lead = step * step_duration`. With a start
//!    time as well, `valid_time = start + lead` replaces whatever the log
//!    printed. The printed value is trusted to be wrong, not checked.
//! 2. Valid times printed in the log: `lead = valid_time - start`, where
//!    `start` defaults to the first record's valid time.
//!
//! With neither, lead time, forecast hour and valid time stay empty.

use jiff::{SignedDuration, civil::DateTime};
use tracing::debug;

use crate::model::{StepRecord, Timeseries, TimeseriesRow};

/// Cycle information the log itself may not carry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeseriesOptions {
    /// Cycle start time.
    pub start_time: Option<DateTime>,

    /// Model time step, e.g. `MODEL_DT` for GRAPES GFS.
    pub step_duration: Option<SignedDuration>,
}

/// Errors that can occur while deriving the timeseries.
#[derive(Debug, thiserror::Error)]
pub enum TimeseriesError {
    #[error("lead time of step {step} is out of range")]
    LeadTimeOverflow { step: u32 },

    #[error("valid time of step {step} is out of range")]
    ValidTimeOverflow { step: u32 },
}

pub type Result<T> = core::result::Result<T, TimeseriesError>;

/// Build the derived table for `records`, keeping their order.
///
/// An empty slice gives an empty timeseries; callers that need rows (the
/// fit) report that themselves.
pub fn build_timeseries(records: &[StepRecord], options: &TimeseriesOptions) -> Result<Timeseries> {
    let start_time = match options.step_duration {
        Some(_) => options.start_time,
        None => options
            .start_time
            .or_else(|| records.first().and_then(|r| r.valid_time)),
    };

    let mut cumulative_time = 0.0;
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        cumulative_time += record.elapsed_seconds;

        let (forecast_lead_time, valid_time) = match options.step_duration {
            Some(step_duration) => {
                let lead = lead_from_step(record.step, step_duration)?;
                let valid_time = match options.start_time {
                    Some(start) => Some(start.checked_add(lead).map_err(|_| {
                        TimeseriesError::ValidTimeOverflow { step: record.step }
                    })?),
                    None => record.valid_time,
                };
                (Some(lead), valid_time)
            }
            None => {
                let lead = record
                    .valid_time
                    .zip(start_time)
                    .map(|(valid, start)| valid.duration_since(start));
                (lead, record.valid_time)
            }
        };

        rows.push(TimeseriesRow {
            step: record.step,
            elapsed_seconds: record.elapsed_seconds,
            cumulative_time,
            forecast_lead_time,
            forecast_hour: forecast_lead_time.map(hours),
            valid_time,
        });
    }

    debug!(
        rows = rows.len(),
        total_seconds = cumulative_time,
        "built timeseries"
    );

    Ok(Timeseries { start_time, rows })
}

fn lead_from_step(step: u32, step_duration: SignedDuration) -> Result<SignedDuration> {
    i32::try_from(step)
        .ok()
        .and_then(|n| step_duration.checked_mul(n))
        .ok_or(TimeseriesError::LeadTimeOverflow { step })
}

fn hours(lead: SignedDuration) -> f64 {
    lead.as_secs_f64() / 3600.0
}
