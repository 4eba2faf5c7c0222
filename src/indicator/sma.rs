use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::indicator::rolling_mean;

/// Simple moving average over the close column.
pub struct Sma {
    window: usize,
}

impl Sma {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }

    /// One entry per input value; the first `window - 1` entries are `None`.
    pub fn calculate(&self, closes: &[f64]) -> Result<Vec<Option<f64>>, Report<IndicatorError>> {
        if closes.is_empty() {
            bail!(IndicatorError::InvalidInput {
                reason: "empty series".into(),
            });
        }
        Ok(rolling_mean(closes, self.window))
    }
}
