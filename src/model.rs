//! Core data model for the log tool.
//!
//! Types only: the parser, builder, predictor and report formatter live in
//! their own top-level modules and produce these values.

mod linear;
mod record;
mod report;
mod timeseries;
mod variant;

pub use linear::{LinearModel, Regressor};
pub use record::{OutputTimeRecord, StepRecord};
pub use report::{
    CurrentRecord, ModelSummary, PredictionReport, PredictionTotal, ReportRequest, TotalEstimate,
};
pub use timeseries::{Timeseries, TimeseriesRow};
pub use variant::{Model, TimeKind};
