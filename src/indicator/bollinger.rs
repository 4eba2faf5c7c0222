use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicator::{rolling_mean, rolling_std};

/// Band width in trailing sample standard deviations.
const BAND_WIDTH_STD: f64 = 2.0;

/// Bollinger bands: a moving-average middle band with upper and lower
/// envelopes at +/- 2 trailing standard deviations.
pub struct BollingerBands {
    window: usize,
}

/// Band values aligned 1:1 with the input series.
#[derive(Debug, Clone, Serialize)]
pub struct BandSeries {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl BollingerBands {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        // Sample standard deviation needs at least two points per window
        if window < 2 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be >= 2".into(),
            });
        }
        Ok(Self { window })
    }

    pub fn calculate(&self, closes: &[f64]) -> Result<BandSeries, Report<IndicatorError>> {
        if closes.is_empty() {
            bail!(IndicatorError::InvalidInput {
                reason: "empty series".into(),
            });
        }

        let middle = rolling_mean(closes, self.window);
        let std = rolling_std(closes, self.window);

        let upper: Vec<Option<f64>> = middle
            .iter()
            .zip(&std)
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => Some(m + BAND_WIDTH_STD * s),
                _ => None,
            })
            .collect();
        let lower: Vec<Option<f64>> = middle
            .iter()
            .zip(&std)
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => Some(m - BAND_WIDTH_STD * s),
                _ => None,
            })
            .collect();

        Ok(BandSeries {
            middle,
            upper,
            lower,
        })
    }
}
