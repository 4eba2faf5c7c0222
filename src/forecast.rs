pub mod trend;

use chrono::NaiveDate;
use error_stack::Report;
use serde::Serialize;

use crate::error::ForecastError;

/// One forecast row: point estimate plus uncertainty interval.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// A fitted forecast model.
pub trait ForecastModel: Send {
    /// Project the fit forward: one point for every historical date plus
    /// `horizon_days` future calendar days, ascending.
    fn predict(&self, horizon_days: u32) -> Vec<ForecastPoint>;
}

/// Fits a model to a `(date, value)` series.
///
/// Input must be sorted ascending by date with no duplicates and hold at
/// least two finite points.
pub trait Forecaster: Send + Sync {
    fn fit(
        &self,
        points: &[(NaiveDate, f64)],
    ) -> Result<Box<dyn ForecastModel>, Report<ForecastError>>;
}
