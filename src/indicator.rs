pub mod bollinger;
pub mod correlation;
pub mod macd;
pub mod rsi;
pub mod sma;

/// Trailing arithmetic mean over `window` values. `window` must be >= 1.
///
/// Output is aligned 1:1 with the input: entry `i` is the value at bar `i`,
/// `None` while the trailing window is not yet filled. An input shorter than
/// the window is not an error, it simply yields no defined entries. The
/// rolling helpers below share this alignment.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if values.len() < window {
        return out;
    }
    for (i, w) in values.windows(window).enumerate() {
        out[i + window - 1] = Some(w.iter().sum::<f64>() / window as f64);
    }
    out
}

/// Trailing sample standard deviation (ddof = 1) over `window` values.
/// `window` must be >= 2.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if values.len() < window {
        return out;
    }
    for (i, w) in values.windows(window).enumerate() {
        let mean = w.iter().sum::<f64>() / window as f64;
        let variance =
            w.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
        out[i + window - 1] = Some(variance.sqrt());
    }
    out
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first value and no bias adjustment. Defined at every index, so the output
/// has the same length as the input with no warmup prefix.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut current = first;
    let mut out = Vec::with_capacity(values.len());
    out.push(current);
    for &value in &values[1..] {
        current = alpha * value + (1.0 - alpha) * current;
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_alignment() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn rolling_mean_window_one_is_identity() {
        let out = rolling_mean(&[5.0, 7.0], 1);
        assert_eq!(out, vec![Some(5.0), Some(7.0)]);
    }

    #[test]
    fn rolling_mean_short_input_all_none() {
        let out = rolling_mean(&[1.0, 2.0], 3);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn rolling_std_uses_sample_variance() {
        // window [1, 2, 3]: mean 2, sample variance (1 + 0 + 1) / 2 = 1
        let out = rolling_std(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 1.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ema_seeds_with_first_value() {
        // span 3 -> alpha 0.5: 1, 1.5, 2.25, 3.125
        let out = ema(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out.len(), 4);
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] - 1.5).abs() < 1e-12);
        assert!((out[2] - 2.25).abs() < 1e-12);
        assert!((out[3] - 3.125).abs() < 1e-12);
    }

    #[test]
    fn ema_flat_input_stays_flat() {
        for v in ema(&[10.0; 6], 4) {
            assert!((v - 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn ema_empty_input() {
        assert!(ema(&[], 3).is_empty());
    }
}
