//! Prediction report: the payload handed to notification.
//!
//! Field names are snake_case because downstream consumers already read
//! this shape.

use jiff::{SignedDuration, civil::DateTime};
use serde::Serialize;

/// Where a run stands and when it is expected to finish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub start_time: DateTime,
    pub request: ReportRequest,
    pub current: CurrentRecord,
    pub model: ModelSummary,
    pub predict: PredictionTotal,
}

/// The forecast hour the report was asked about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRequest {
    /// Lead time as `"<hours>h"`.
    pub forecast_time: String,
    pub valid_time: DateTime,
}

/// The latest row seen in the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentRecord {
    pub forecast_time: Option<SignedDuration>,
    pub valid_time: Option<DateTime>,

    /// Cumulative time in minutes.
    pub ctime: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub coef: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionTotal {
    pub total: TotalEstimate,
}

/// Predicted cumulative time at the end of the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalEstimate {
    /// Forecast length as `"<hours>h"`.
    pub forecast_time: String,

    /// Predicted cumulative time in minutes.
    pub ctime: f64,
}
