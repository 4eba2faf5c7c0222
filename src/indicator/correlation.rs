use serde::Serialize;

use crate::model::{Column, PriceSeries};

/// Pairwise Pearson correlation over the five OHLCV columns.
///
/// `values[i][j]` correlates `columns[i]` with `columns[j]`. Cells are `None`
/// for a degenerate pair (zero variance or fewer than two usable rows); the
/// diagonal is exactly 1.0. Symmetric by construction.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: [&'static str; 5],
    pub values: [[Option<f64>; 5]; 5],
}

pub fn calculate(series: &PriceSeries) -> CorrelationMatrix {
    let data: Vec<Vec<f64>> = Column::ALL.iter().map(|&c| series.column(c)).collect();

    let mut values = [[None; 5]; 5];
    for i in 0..Column::ALL.len() {
        values[i][i] = Some(1.0);
        for j in (i + 1)..Column::ALL.len() {
            let r = pearson(&data[i], &data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: Column::ALL.map(Column::as_str),
        values,
    }
}

/// Pearson coefficient over the rows where both values are finite.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    // Rounding can push a perfect correlation a hair past 1.0
    Some((covariance / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}
