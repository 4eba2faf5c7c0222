use chrono::{Datelike, Duration, NaiveDate};
use error_stack::{Report, bail};

use crate::error::ForecastError;
use crate::forecast::{ForecastModel, ForecastPoint, Forecaster};

/// z-score of the 80% central interval.
const INTERVAL_Z: f64 = 1.2816;

const WEEK: usize = 7;

/// Additive trend-plus-weekly-seasonality model for daily observations.
///
/// The trend is an ordinary least-squares line over day offsets from the
/// first observation. The weekly component is the mean detrended residual
/// per weekday; weekdays absent from the input contribute zero. The
/// uncertainty band is a constant `z * sigma` of the residuals around the
/// combined fit.
pub struct TrendForecaster;

struct TrendModel {
    origin: NaiveDate,
    last: NaiveDate,
    dates: Vec<NaiveDate>,
    slope: f64,
    intercept: f64,
    weekly: [f64; WEEK],
    sigma: f64,
}

impl TrendModel {
    fn value_at(&self, date: NaiveDate) -> f64 {
        let x = (date - self.origin).num_days() as f64;
        let weekday = date.weekday().num_days_from_monday() as usize;
        self.intercept + self.slope * x + self.weekly[weekday]
    }

    fn point_at(&self, date: NaiveDate) -> ForecastPoint {
        let yhat = self.value_at(date);
        let band = INTERVAL_Z * self.sigma;
        ForecastPoint {
            date,
            yhat,
            yhat_lower: yhat - band,
            yhat_upper: yhat + band,
        }
    }
}

impl ForecastModel for TrendModel {
    fn predict(&self, horizon_days: u32) -> Vec<ForecastPoint> {
        let mut out: Vec<ForecastPoint> =
            self.dates.iter().map(|&date| self.point_at(date)).collect();
        for offset in 1..=i64::from(horizon_days) {
            out.push(self.point_at(self.last + Duration::days(offset)));
        }
        out
    }
}

impl Forecaster for TrendForecaster {
    fn fit(
        &self,
        points: &[(NaiveDate, f64)],
    ) -> Result<Box<dyn ForecastModel>, Report<ForecastError>> {
        if points.len() < 2 {
            bail!(ForecastError::InvalidInput {
                reason: "need at least two points".to_string(),
            });
        }
        for (i, (date, value)) in points.iter().enumerate() {
            if !value.is_finite() {
                bail!(ForecastError::InvalidInput {
                    reason: format!("non-finite value at index {i}"),
                });
            }
            if i > 0 && *date <= points[i - 1].0 {
                bail!(ForecastError::InvalidInput {
                    reason: "dates must be strictly increasing".to_string(),
                });
            }
        }

        let origin = points[0].0;
        let last = points[points.len() - 1].0;
        let xs: Vec<f64> = points
            .iter()
            .map(|(date, _)| (*date - origin).num_days() as f64)
            .collect();
        let ys: Vec<f64> = points.iter().map(|(_, value)| *value).collect();
        let (slope, intercept) = least_squares(&xs, &ys);

        let mut sums = [0.0; WEEK];
        let mut counts = [0usize; WEEK];
        for ((date, _), (&x, &y)) in points.iter().zip(xs.iter().zip(&ys)) {
            let weekday = date.weekday().num_days_from_monday() as usize;
            sums[weekday] += y - (intercept + slope * x);
            counts[weekday] += 1;
        }
        let mut weekly = [0.0; WEEK];
        for i in 0..WEEK {
            if counts[i] > 0 {
                weekly[i] = sums[i] / counts[i] as f64;
            }
        }

        let mut sq_sum = 0.0;
        for ((date, _), (&x, &y)) in points.iter().zip(xs.iter().zip(&ys)) {
            let weekday = date.weekday().num_days_from_monday() as usize;
            let fitted = intercept + slope * x + weekly[weekday];
            sq_sum += (y - fitted).powi(2);
        }
        let sigma = (sq_sum / points.len() as f64).sqrt();

        Ok(Box::new(TrendModel {
            origin,
            last,
            dates: points.iter().map(|(date, _)| *date).collect(),
            slope,
            intercept,
            weekly,
            sigma,
        }))
    }
}

/// Ordinary least squares over `(x, y)` pairs. Zero spread in `x` flattens
/// to the mean of `y`.
fn least_squares(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var += (x - mean_x).powi(2);
    }
    if var == 0.0 {
        return (0.0, mean_y);
    }
    let slope = cov / var;
    (slope, mean_y - slope * mean_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset as i64)
    }

    fn linear_points(len: u64, start: f64, step: f64) -> Vec<(NaiveDate, f64)> {
        (0..len)
            .map(|i| (day(i), start + step * i as f64))
            .collect()
    }

    #[test]
    fn rejects_short_input() {
        let result = TrendForecaster.fit(&[(day(0), 100.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unsorted_dates() {
        let points = vec![(day(1), 100.0), (day(0), 101.0)];
        assert!(TrendForecaster.fit(&points).is_err());
    }

    #[test]
    fn rejects_duplicate_dates() {
        let points = vec![(day(0), 100.0), (day(0), 101.0)];
        assert!(TrendForecaster.fit(&points).is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        let points = vec![(day(0), 100.0), (day(1), f64::NAN)];
        assert!(TrendForecaster.fit(&points).is_err());
    }

    #[test]
    fn recovers_exact_linear_trend() {
        // Fourteen consecutive days cover each weekday twice, so the weekly
        // component fits to zero and the line is recovered exactly.
        let points = linear_points(14, 100.0, 2.0);
        let model = TrendForecaster.fit(&points).unwrap();
        let forecast = model.predict(7);

        assert_eq!(forecast.len(), 21);
        for (point, (date, value)) in forecast.iter().zip(&points) {
            assert_eq!(point.date, *date);
            assert!((point.yhat - value).abs() < 1e-9);
        }
        let first_future = &forecast[14];
        assert_eq!(first_future.date, day(14));
        assert!((first_future.yhat - 128.0).abs() < 1e-9);
        let last_future = &forecast[20];
        assert_eq!(last_future.date, day(20));
        assert!((last_future.yhat - 140.0).abs() < 1e-9);
    }

    #[test]
    fn exact_fit_collapses_the_band() {
        let points = linear_points(14, 50.0, 1.0);
        let model = TrendForecaster.fit(&points).unwrap();
        for point in model.predict(3) {
            assert!((point.yhat_lower - point.yhat).abs() < 1e-9);
            assert!((point.yhat_upper - point.yhat).abs() < 1e-9);
        }
    }

    #[test]
    fn captures_a_weekday_bump() {
        // 2024-01-01 is a Monday. Four full weeks with a +3 bump every
        // Monday; the fitted gap between next Monday and next Tuesday
        // should sit near that bump.
        let points: Vec<(NaiveDate, f64)> = (0..28)
            .map(|i| {
                let bump = if i % 7 == 0 { 3.0 } else { 0.0 };
                (day(i), 100.0 + bump)
            })
            .collect();
        let model = TrendForecaster.fit(&points).unwrap();
        let forecast = model.predict(7);

        let next_monday = &forecast[28];
        let next_tuesday = &forecast[29];
        assert_eq!(next_monday.date, day(28));
        let gap = next_monday.yhat - next_tuesday.yhat;
        assert!((gap - 3.0).abs() < 0.5, "weekday gap was {gap}");
    }

    #[test]
    fn future_dates_fill_calendar_gaps() {
        // Weekday-only history; the horizon still walks every calendar day.
        let points: Vec<(NaiveDate, f64)> = (0..14)
            .filter(|i| day(*i).weekday().num_days_from_monday() < 5)
            .map(|i| (day(i), 100.0 + i as f64))
            .collect();
        assert_eq!(points.len(), 10);

        let model = TrendForecaster.fit(&points).unwrap();
        let forecast = model.predict(4);
        assert_eq!(forecast.len(), 14);
        // History ends Friday 2024-01-12; the horizon starts Saturday.
        assert_eq!(forecast[10].date, day(12));
        assert_eq!(forecast[11].date, day(13));
        assert_eq!(forecast[12].date, day(14));
        assert_eq!(forecast[13].date, day(15));
    }

    #[test]
    fn band_is_symmetric_around_the_estimate() {
        let points: Vec<(NaiveDate, f64)> = (0..20)
            .map(|i| {
                let noise = if i % 2 == 0 { 1.5 } else { -1.5 };
                (day(i), 200.0 + i as f64 + noise)
            })
            .collect();
        let model = TrendForecaster.fit(&points).unwrap();
        for point in model.predict(5) {
            assert!(point.yhat_lower <= point.yhat);
            assert!(point.yhat <= point.yhat_upper);
            let below = point.yhat - point.yhat_lower;
            let above = point.yhat_upper - point.yhat;
            assert!((below - above).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_horizon_returns_history_only() {
        let points = linear_points(5, 10.0, 1.0);
        let model = TrendForecaster.fit(&points).unwrap();
        assert_eq!(model.predict(0).len(), 5);
    }

    #[test]
    fn least_squares_known_line() {
        let (slope, intercept) = least_squares(&[0.0, 1.0, 2.0], &[5.0, 7.0, 9.0]);
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 5.0).abs() < 1e-12);
    }
}
