use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use error_stack::{Report, ResultExt, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{FetchKey, SeriesCache};
use crate::error::SnapshotError;
use crate::forecast::{ForecastModel, ForecastPoint, Forecaster};
use crate::indicator::bollinger::{BandSeries, BollingerBands};
use crate::indicator::correlation::{self, CorrelationMatrix};
use crate::indicator::macd::{Macd, MacdSeries};
use crate::indicator::rsi::Rsi;
use crate::indicator::sma::Sma;
use crate::model::{DailyBar, PriceSeries};
use crate::provider::PriceHistory;
use crate::symbols::SymbolTable;

/// Inclusive bounds and default for one dashboard parameter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ControlRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

pub const HORIZON_YEARS: ControlRange = ControlRange {
    min: 1,
    max: 5,
    default: 1,
};
pub const MA_WINDOW: ControlRange = ControlRange {
    min: 5,
    max: 50,
    default: 20,
};
pub const BOLLINGER_WINDOW: ControlRange = ControlRange {
    min: 10,
    max: 50,
    default: 20,
};
pub const RSI_WINDOW: ControlRange = ControlRange {
    min: 5,
    max: 50,
    default: 14,
};

/// Parameter ranges a frontend renders as sliders.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Controls {
    pub horizon_years: ControlRange,
    pub ma_window: ControlRange,
    pub bollinger_window: ControlRange,
    pub rsi_window: ControlRange,
}

pub fn controls() -> Controls {
    Controls {
        horizon_years: HORIZON_YEARS,
        ma_window: MA_WINDOW,
        bollinger_window: BOLLINGER_WINDOW,
        rsi_window: RSI_WINDOW,
    }
}

/// One snapshot request. Missing parameters fall back to the control
/// defaults; present ones must sit inside the control bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardRequest {
    pub name: String,
    pub horizon_years: Option<u32>,
    pub ma_window: Option<u32>,
    pub bollinger_window: Option<u32>,
    pub rsi_window: Option<u32>,
}

/// The parameters a snapshot was actually computed with.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SnapshotParams {
    pub horizon_years: u32,
    pub ma_window: u32,
    pub bollinger_window: u32,
    pub rsi_window: u32,
}

/// Everything one dashboard render needs, aligned 1:1 with `series` except
/// for `forecast`, which also extends past the last bar.
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot {
    pub name: String,
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub params: SnapshotParams,
    pub series: Vec<DailyBar>,
    pub moving_average: Vec<Option<f64>>,
    pub bollinger: BandSeries,
    pub rsi: Vec<Option<f64>>,
    pub macd: MacdSeries,
    pub correlation: CorrelationMatrix,
    pub forecast: Vec<ForecastPoint>,
}

/// Snapshot assembly: resolves the symbol, loads prices through the cache,
/// runs the indicator pipeline and the forecast.
pub struct Dashboard {
    symbols: SymbolTable,
    provider: Arc<dyn PriceHistory>,
    forecaster: Arc<dyn Forecaster>,
    cache: SeriesCache,
    start_date: NaiveDate,
}

impl Dashboard {
    pub fn new(
        symbols: SymbolTable,
        provider: Arc<dyn PriceHistory>,
        forecaster: Arc<dyn Forecaster>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            symbols,
            provider,
            forecaster,
            cache: SeriesCache::new(),
            start_date,
        }
    }

    pub fn symbol_names(&self) -> Vec<String> {
        self.symbols.names().to_vec()
    }

    pub async fn build_snapshot(
        &self,
        request: &DashboardRequest,
    ) -> Result<DashboardSnapshot, Report<SnapshotError>> {
        let horizon_years = checked_param(request.horizon_years, HORIZON_YEARS, "horizon_years")?;
        let ma_window = checked_param(request.ma_window, MA_WINDOW, "ma_window")?;
        let bollinger_window =
            checked_param(request.bollinger_window, BOLLINGER_WINDOW, "bollinger_window")?;
        let rsi_window = checked_param(request.rsi_window, RSI_WINDOW, "rsi_window")?;

        let ticker = self
            .symbols
            .resolve(&request.name)
            .change_context(SnapshotError::Symbol)?
            .to_string();
        let end = Utc::now().date_naive();
        let series = self.fetch_cached(&ticker, end).await?;

        let closes = series.closes();
        let moving_average = Sma::new(ma_window as usize)
            .change_context(SnapshotError::Indicator)?
            .calculate(&closes)
            .change_context(SnapshotError::Indicator)?;
        let bollinger = BollingerBands::new(bollinger_window as usize)
            .change_context(SnapshotError::Indicator)?
            .calculate(&closes)
            .change_context(SnapshotError::Indicator)?;
        let rsi = Rsi::new(rsi_window as usize)
            .change_context(SnapshotError::Indicator)?
            .calculate(&closes)
            .change_context(SnapshotError::Indicator)?;
        let macd = Macd::default()
            .calculate(&closes)
            .change_context(SnapshotError::Indicator)?;
        let correlation = correlation::calculate(&series);

        let points: Vec<(NaiveDate, f64)> = series
            .bars()
            .iter()
            .map(|bar| (bar.date, bar.close))
            .collect();
        let forecast = self
            .forecaster
            .fit(&points)
            .change_context(SnapshotError::Forecast)?
            .predict(horizon_years * 365);

        info!(
            name = %request.name,
            ticker = %ticker,
            bars = series.bars().len(),
            "dashboard snapshot built"
        );

        Ok(DashboardSnapshot {
            name: request.name.clone(),
            ticker,
            start: self.start_date,
            end,
            params: SnapshotParams {
                horizon_years,
                ma_window,
                bollinger_window,
                rsi_window,
            },
            series: series.bars().to_vec(),
            moving_average,
            bollinger,
            rsi,
            macd,
            correlation,
            forecast,
        })
    }

    async fn fetch_cached(
        &self,
        ticker: &str,
        end: NaiveDate,
    ) -> Result<Arc<PriceSeries>, Report<SnapshotError>> {
        let key = FetchKey {
            ticker: ticker.to_string(),
            start: self.start_date,
            end,
        };
        if let Some(series) = self.cache.get(&key) {
            debug!(ticker, "serving cached price series");
            return Ok(series);
        }

        let series = self
            .provider
            .fetch_daily(ticker, self.start_date, end)
            .await
            .change_context(SnapshotError::Fetch)?;
        let series = Arc::new(series);
        self.cache.insert(key, Arc::clone(&series));
        Ok(series)
    }
}

fn checked_param(
    value: Option<u32>,
    range: ControlRange,
    name: &str,
) -> Result<u32, Report<SnapshotError>> {
    let value = value.unwrap_or(range.default);
    if value < range.min || value > range.max {
        bail!(SnapshotError::InvalidRequest {
            reason: format!("{name} must be between {} and {}", range.min, range.max),
        });
    }
    Ok(value)
}
