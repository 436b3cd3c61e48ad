//! Output formatting for CLI display.

use jiff::SignedDuration;

use crate::model::{LinearModel, OutputTimeRecord, Timeseries, TimeseriesRow};

const MISSING: &str = "-";

/// Format the timeseries as aligned columns.
pub(super) fn format_timeseries(series: &Timeseries) -> String {
    if series.is_empty() {
        return "No timing lines found".to_string();
    }

    let header = format!(
        "{:>8}  {:>10}  {:>12}  {:>13}  {:>13}  {}",
        "step", "time", "ctime", "forecast_time", "forecast_hour", "valid_time"
    );
    std::iter::once(header)
        .chain(series.rows.iter().map(format_row))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_row(row: &TimeseriesRow) -> String {
    let lead = row
        .forecast_lead_time
        .map_or_else(|| MISSING.to_string(), format_lead);
    let hour = row
        .forecast_hour
        .map_or_else(|| MISSING.to_string(), |h| format!("{h:.6}"));
    let valid = row
        .valid_time
        .map_or_else(|| MISSING.to_string(), |t| t.to_string());
    format!(
        "{:>8}  {:>10.4}  {:>12.4}  {lead:>13}  {hour:>13}  {valid}",
        row.step, row.elapsed_seconds, row.cumulative_time
    )
}

/// Format a lead time as `HH:MM:SS`, letting hours run past 24.
pub(super) fn format_lead(lead: SignedDuration) -> String {
    let secs = lead.as_secs();
    let sign = if secs < 0 { "-" } else { "" };
    let secs = secs.unsigned_abs();
    format!(
        "{sign}{:02}:{:02}:{:02}",
        secs / 3600,
        secs % 3600 / 60,
        secs % 60
    )
}

/// Format output-write durations, one per line, with their total.
pub(super) fn format_output_times(records: &[OutputTimeRecord]) -> String {
    if records.is_empty() {
        return "No output lines found".to_string();
    }

    let total: f64 = records.iter().map(|r| r.seconds).sum();
    records
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{i:>6}  {:>12.4}", r.seconds))
        .chain(std::iter::once(format!("{:>6}  {total:>12.4}", "total")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a fitted line and how well it fits.
pub(super) fn format_model(model: &LinearModel) -> String {
    format!(
        "ctime = {:.6} * {} + {:.6}\nr² = {:.4} over {} rows",
        model.slope, model.regressor, model.intercept, model.r_squared, model.n_observations
    )
}

/// Format a single prediction in seconds and minutes.
pub(super) fn format_prediction(model: &LinearModel, x: f64) -> String {
    let seconds = model.predict(x);
    format!(
        "{} {x}: {seconds:.1} s ({:.2} min)",
        model.regressor,
        seconds / 60.0
    )
}
