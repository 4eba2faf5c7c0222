use error_stack::{Report, bail};

use crate::error::IndicatorError;

/// RSI (Relative Strength Index) over trailing simple means of gains and
/// losses, bounded to [0, 100].
pub struct Rsi {
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Result<Self, Report<IndicatorError>> {
        if window == 0 {
            bail!(IndicatorError::InvalidParameter {
                name: "window must be > 0".into(),
            });
        }
        Ok(Self { window })
    }

    /// One entry per input value. Entry `i` averages the `window` deltas
    /// ending at `i`, so the first defined index is `window` itself
    /// (there is no delta for the first close).
    pub fn calculate(&self, closes: &[f64]) -> Result<Vec<Option<f64>>, Report<IndicatorError>> {
        if closes.is_empty() {
            bail!(IndicatorError::InvalidInput {
                reason: "empty series".into(),
            });
        }

        let mut out = vec![None; closes.len()];
        let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
        if deltas.len() < self.window {
            return Ok(out);
        }

        for (i, w) in deltas.windows(self.window).enumerate() {
            let avg_gain = w.iter().map(|&d| d.max(0.0)).sum::<f64>() / self.window as f64;
            let avg_loss = w.iter().map(|&d| (-d).max(0.0)).sum::<f64>() / self.window as f64;
            out[i + self.window] = Some(rsi_value(avg_gain, avg_loss));
        }

        Ok(out)
    }
}

/// RSI with explicit guards for the zero-loss cases: a flat window reads as
/// neutral 50, a gain-only window saturates at 100.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return 50.0;
        }
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
