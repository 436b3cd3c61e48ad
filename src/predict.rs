//! Linear prediction: ordinary least squares of cumulative time against
//! step or forecast hour.
//!
//! Model integration runs at a roughly constant rate, so a plain line is
//! enough to extrapolate how long the rest of the forecast will take. No
//! weighting, no regularization, no outlier handling.

use tracing::debug;

use crate::model::{LinearModel, Regressor, Timeseries, TimeseriesRow};

/// Errors that can occur while fitting.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("need at least {required} rows to fit a line, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("every row has the same {0}; the slope is undefined")]
    ZeroVariance(Regressor),

    #[error("row {row} has no {regressor}; pass a step duration or use a log with valid times")]
    MissingRegressor { regressor: Regressor, row: usize },

    #[error("cumulative times are too large to fit a finite line")]
    NonFinite,
}

pub type Result<T> = core::result::Result<T, FitError>;

/// Fit `cumulative_time = slope * x + intercept` over every row of `series`.
#[allow(clippy::float_cmp)]
pub fn fit(series: &Timeseries, regressor: Regressor) -> Result<LinearModel> {
    if series.len() < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            actual: series.len(),
        });
    }

    let xs = series
        .rows
        .iter()
        .enumerate()
        .map(|(row, r)| {
            regressor_value(r, regressor).ok_or(FitError::MissingRegressor { regressor, row })
        })
        .collect::<Result<Vec<f64>>>()?;
    let ys: Vec<f64> = series.rows.iter().map(|r| r.cumulative_time).collect();

    if xs.iter().all(|&x| x == xs[0]) {
        return Err(FitError::ZeroVariance(regressor));
    }

    #[allow(clippy::cast_precision_loss)]
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (sxx, sxy) = xs
        .iter()
        .zip(&ys)
        .fold((0.0, 0.0), |(sxx, sxy), (&x, &y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(FitError::NonFinite);
    }

    let ss_tot: f64 = ys.iter().map(|&y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(&x, &y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    debug!(%regressor, slope, intercept, r_squared, rows = xs.len(), "fit linear model");

    Ok(LinearModel {
        regressor,
        slope,
        intercept,
        n_observations: xs.len(),
        r_squared,
    })
}

fn regressor_value(row: &TimeseriesRow, regressor: Regressor) -> Option<f64> {
    match regressor {
        Regressor::Step => Some(f64::from(row.step)),
        Regressor::ForecastHour => row.forecast_hour,
    }
}
