use std::num::NonZeroU32;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime};
use error_stack::{Report, ResultExt, bail};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::Deserialize;
use tracing::info;

use crate::error::FetchError;
use crate::model::{DailyBar, PriceSeries};
use crate::provider::PriceHistory;

/// Daily price history from the Yahoo Finance v8 chart API.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl YahooProvider {
    /// `base_url` points at a chart endpoint root, e.g.
    /// `https://query1.finance.yahoo.com/v8/finance/chart`.
    pub fn new(base_url: impl Into<String>, requests_per_second: NonZeroU32) -> Self {
        let quota = Quota::per_second(requests_per_second);
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }
}

impl PriceHistory for YahooProvider {
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, Result<PriceSeries, Report<FetchError>>> {
        let ticker = ticker.to_owned();
        Box::pin(async move {
            // Wait for rate limiter before making the request
            self.rate_limiter.until_ready().await;

            let url = format!("{}/{}", self.base_url, ticker);
            let period1 = day_start_epoch(start);
            // period2 is exclusive, so push it one day past `end`
            let period2 = day_start_epoch(end + chrono::Duration::days(1));

            let period1_str = period1.to_string();
            let period2_str = period2.to_string();
            let params = [
                ("period1", period1_str.as_str()),
                ("period2", period2_str.as_str()),
                ("interval", "1d"),
            ];

            let response = self
                .client
                .get(&url)
                // Yahoo rejects requests without a browser-like agent
                .header("User-Agent", "Mozilla/5.0")
                .query(&params)
                .send()
                .await
                .change_context(FetchError::Request {
                    ticker: ticker.clone(),
                })?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                bail!(FetchError::UnknownTicker { ticker });
            }
            if !response.status().is_success() {
                return Err(Report::new(FetchError::Request {
                    ticker: ticker.clone(),
                })
                .attach(format!("HTTP status: {}", response.status())));
            }

            let chart: ChartResponse =
                response
                    .json()
                    .await
                    .change_context(FetchError::ResponseParse {
                        ticker: ticker.clone(),
                    })?;

            let bars = bars_from_chart(chart.chart, &ticker)?;
            if bars.is_empty() {
                bail!(FetchError::EmptyRange { ticker });
            }

            let series = PriceSeries::new(ticker.clone(), bars).change_context(
                FetchError::ResponseParse {
                    ticker: ticker.clone(),
                },
            )?;

            info!(
                ticker = %series.ticker(),
                bars = series.bars().len(),
                "daily price history fetched"
            );

            Ok(series)
        })
    }
}

fn day_start_epoch(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

// ── Chart API response types ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

/// Parallel per-field arrays; a null entry marks a row Yahoo could not fill.
#[derive(Debug, Deserialize)]
struct ChartQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

fn bars_from_chart(chart: ChartBody, ticker: &str) -> Result<Vec<DailyBar>, Report<FetchError>> {
    if let Some(error) = chart.error {
        return Err(Report::new(FetchError::UnknownTicker {
            ticker: ticker.to_owned(),
        })
        .attach(format!("{}: {}", error.code, error.description)));
    }

    let result = chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| {
            Report::new(FetchError::ResponseParse {
                ticker: ticker.to_owned(),
            })
        })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| {
            Report::new(FetchError::ResponseParse {
                ticker: ticker.to_owned(),
            })
        })?;

    let mut bars: Vec<DailyBar> = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let fields = (
            field(&quote.open, i),
            field(&quote.high, i),
            field(&quote.low, i),
            field(&quote.close, i),
            field(&quote.volume, i),
        );
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = fields else {
            // Null-padded rows (holidays, halted sessions) carry no bar
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        // The still-forming live bar shares its date with the last complete one
        if bars.last().is_some_and(|prev| prev.date >= date) {
            continue;
        }
        bars.push(DailyBar {
            date,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(bars)
}

fn field(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChartBody {
        serde_json::from_str::<ChartResponse>(json)
            .expect("chart parse failed")
            .chart
    }

    // 2024-01-02, 2024-01-03 and 2024-01-04, 14:30 UTC
    const THREE_DAYS: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open":   [186.06, 184.22, 182.15],
                        "high":   [186.74, 185.88, 183.09],
                        "low":    [183.89, 183.43, 180.88],
                        "close":  [185.64, 184.25, 181.91],
                        "volume": [82488700, 58414500, 71983600]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn full_rows_parse_into_bars() {
        let bars = bars_from_chart(parse(THREE_DAYS), "AAPL").unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert!((bars[0].open - 186.06).abs() < 1e-9);
        assert!((bars[1].close - 184.25).abs() < 1e-9);
        assert!((bars[2].volume - 71983600.0).abs() < 1e-9);
    }

    #[test]
    fn null_padded_rows_skipped() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704205800, 1704292200],
                    "indicators": {
                        "quote": [{
                            "open":   [186.06, null],
                            "high":   [186.74, null],
                            "low":    [183.89, null],
                            "close":  [185.64, null],
                            "volume": [82488700, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let bars = bars_from_chart(parse(json), "AAPL").unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn live_bar_on_same_date_skipped() {
        // Second timestamp is later the same UTC day
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704205800, 1704222000],
                    "indicators": {
                        "quote": [{
                            "open":   [186.06, 186.10],
                            "high":   [186.74, 186.80],
                            "low":    [183.89, 184.00],
                            "close":  [185.64, 185.70],
                            "volume": [82488700, 1000000]
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let bars = bars_from_chart(parse(json), "AAPL").unwrap();
        assert_eq!(bars.len(), 1);
        assert!((bars[0].close - 185.64).abs() < 1e-9);
    }

    #[test]
    fn chart_error_is_unknown_ticker() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {
                    "code": "Not Found",
                    "description": "No data found, symbol may be delisted"
                }
            }
        }"#;
        let report = bars_from_chart(parse(json), "NOPE").unwrap_err();
        assert!(matches!(
            report.current_context(),
            FetchError::UnknownTicker { .. }
        ));
    }

    #[test]
    fn missing_result_is_parse_error() {
        let json = r#"{"chart": {"result": [], "error": null}}"#;
        let report = bars_from_chart(parse(json), "AAPL").unwrap_err();
        assert!(matches!(
            report.current_context(),
            FetchError::ResponseParse { .. }
        ));
    }

    #[test]
    fn missing_timestamps_yield_no_bars() {
        let json = r#"{
            "chart": {
                "result": [{
                    "indicators": {
                        "quote": [{
                            "open": [], "high": [], "low": [], "close": [], "volume": []
                        }]
                    }
                }],
                "error": null
            }
        }"#;
        let bars = bars_from_chart(parse(json), "AAPL").unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn epoch_conversion_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        assert_eq!(day_start_epoch(date), 1420070400);
    }

    /// Integration test: requires network access. Run with `cargo test -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn integration_fetch_daily() {
        let provider = YahooProvider::new(
            "https://query1.finance.yahoo.com/v8/finance/chart",
            NonZeroU32::new(2).unwrap(),
        );
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let series = provider.fetch_daily("AAPL", start, end).await.unwrap();
        assert!(!series.bars().is_empty());
        assert!(series.bars().iter().all(|b| b.date >= start && b.date <= end));
    }
}
