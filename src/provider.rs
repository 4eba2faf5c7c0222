pub mod yahoo;

use chrono::NaiveDate;
use error_stack::Report;
use futures::future::BoxFuture;

use crate::error::FetchError;
use crate::model::PriceSeries;

/// Abstraction over a daily price history source.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn PriceHistory`).
pub trait PriceHistory: Send + Sync {
    /// Fetch the daily OHLCV series for `ticker` covering `start..=end`.
    ///
    /// An empty result window is a fetch error, never an empty series.
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<FetchError>>>;
}
