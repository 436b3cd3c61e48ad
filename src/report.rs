//! Prediction reports: combine a fitted model with the latest row into the
//! payload sent out for notification.

use jiff::{SignedDuration, civil::DateTime};

use crate::model::{
    CurrentRecord, LinearModel, ModelSummary, PredictionReport, PredictionTotal, Regressor,
    ReportRequest, TimeseriesRow, TotalEstimate,
};

/// Errors that can occur while building a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("reports need a model fit on forecast hour, got one fit on {0}")]
    WrongRegressor(Regressor),

    #[error("forecast hour {0} is out of range for the start time")]
    ValidTimeOverflow(i64),
}

pub type Result<T> = core::result::Result<T, ReportError>;

/// Build the report for a cycle starting at `start_time`.
///
/// `forecast_hour` is the hour being reported on; `forecast_length` is the
/// final hour of the forecast, where the model is evaluated to estimate the
/// total run time. `current` is normally the last row of the timeseries.
pub fn build_report(
    start_time: DateTime,
    forecast_hour: i64,
    forecast_length: i64,
    current: &TimeseriesRow,
    model: &LinearModel,
) -> Result<PredictionReport> {
    if model.regressor != Regressor::ForecastHour {
        return Err(ReportError::WrongRegressor(model.regressor));
    }

    let valid_time = forecast_hour
        .checked_mul(3600)
        .map(SignedDuration::from_secs)
        .and_then(|lead| start_time.checked_add(lead).ok())
        .ok_or(ReportError::ValidTimeOverflow(forecast_hour))?;

    #[allow(clippy::cast_precision_loss)]
    let predicted_minutes = model.predict(forecast_length as f64) / 60.0;

    Ok(PredictionReport {
        start_time,
        request: ReportRequest {
            forecast_time: format!("{forecast_hour}h"),
            valid_time,
        },
        current: CurrentRecord {
            forecast_time: current.forecast_lead_time,
            valid_time: current.valid_time,
            ctime: current.cumulative_time / 60.0,
        },
        model: ModelSummary {
            kind: "linear".to_string(),
            coef: model.slope,
            intercept: model.intercept,
        },
        predict: PredictionTotal {
            total: TotalEstimate {
                forecast_time: format!("{forecast_length}h"),
                ctime: predicted_minutes,
            },
        },
    })
}
