use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicator::ema;

/// MACD (Moving Average Convergence Divergence) from first-value-seeded
/// exponential moving averages.
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
}

/// MACD output aligned 1:1 with the input. Every index is defined because
/// the underlying EMAs are seeded with the first value.
#[derive(Debug, Clone, Serialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self, Report<IndicatorError>> {
        if fast == 0 || signal == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "all spans must be > 0".into(),
            });
        }
        if fast >= slow {
            bail!(IndicatorError::InvalidParameter {
                name: "fast span must be < slow span".into(),
            });
        }
        Ok(Self { fast, slow, signal })
    }

    pub fn calculate(&self, closes: &[f64]) -> Result<MacdSeries, Report<IndicatorError>> {
        if closes.is_empty() {
            bail!(IndicatorError::InvalidInput {
                reason: "empty series".into(),
            });
        }

        let fast_ema = ema(closes, self.fast);
        let slow_ema = ema(closes, self.slow);
        let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
        let signal = ema(&macd, self.signal);
        let histogram: Vec<f64> = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        Ok(MacdSeries {
            macd,
            signal,
            histogram,
        })
    }
}

impl Default for Macd {
    /// The standard 12/26/9 parameterization.
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}
