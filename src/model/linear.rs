//! Linear model: a fitted line from a regressor to cumulative time.

use std::fmt;

use serde::Serialize;

/// The independent variable of a fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Regressor {
    /// The model's step counter.
    Step,

    /// Lead time in fractional hours.
    ForecastHour,
}

impl fmt::Display for Regressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => f.write_str("step"),
            Self::ForecastHour => f.write_str("forecast hour"),
        }
    }
}

/// `cumulative_time ≈ slope * x + intercept`, fit once and then read-only.
///
/// Holds only coefficients and fit statistics, never the series it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearModel {
    pub regressor: Regressor,
    pub slope: f64,
    pub intercept: f64,
    pub n_observations: usize,

    /// Coefficient of determination over the training rows.
    pub r_squared: f64,
}

impl LinearModel {
    /// Estimated cumulative seconds at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_evaluates_the_line() {
        let model = LinearModel {
            regressor: Regressor::Step,
            slope: 2.0,
            intercept: 5.0,
            n_observations: 3,
            r_squared: 1.0,
        };
        assert!((model.predict(10.0) - 25.0).abs() < f64::EPSILON);
        assert!((model.predict(0.0) - 5.0).abs() < f64::EPSILON);
    }
}
