use chrono::NaiveDate;
use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::SeriesError;

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// The five numeric columns of a daily bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }

    fn extract(self, bar: &DailyBar) -> f64 {
        match self {
            Self::Open => bar.open,
            Self::High => bar.high,
            Self::Low => bar.low,
            Self::Close => bar.close,
            Self::Volume => bar.volume,
        }
    }
}

/// A validated daily price series for a single ticker.
///
/// Bars are ordered by strictly increasing date (no duplicates) and every
/// numeric field is finite and non-negative. Construction rejects anything
/// else, so downstream computations never see NaNs or shuffled dates.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn new(
        ticker: impl Into<String>,
        bars: Vec<DailyBar>,
    ) -> Result<Self, Report<SeriesError>> {
        if bars.is_empty() {
            bail!(SeriesError::Empty);
        }
        for (index, bar) in bars.iter().enumerate() {
            for column in Column::ALL {
                let value = column.extract(bar);
                if !value.is_finite() || value < 0.0 {
                    bail!(SeriesError::InvalidValue {
                        column: column.as_str(),
                        index,
                    });
                }
            }
            if index > 0 && bar.date <= bars[index - 1].date {
                bail!(SeriesError::UnorderedDates { index });
            }
        }
        Ok(Self {
            ticker: ticker.into(),
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    /// Extract one column as a fresh vector.
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.bars.iter().map(|b| column.extract(b)).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(Column::Close)
    }
}
