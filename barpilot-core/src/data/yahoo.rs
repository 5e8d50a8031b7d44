//! Yahoo Finance intraday provider.
//!
//! Fetches recent intraday bars from Yahoo's v8 chart API and returns them
//! the way multi-symbol downloads arrive: a two-level (field, symbol) labelled
//! frame with UTC timestamps. One request per fetch, no retries; failures
//! propagate to the caller.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use std::time::Duration;

use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

use super::frame::{ColumnLabel, RawColumn, RawFrame, TimeIndex};
use super::provider::{DataError, DataProvider, FetchRequest};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

pub struct YahooChartProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/v8/finance/chart/{}?range={}d&interval={}&includePrePost=false",
            self.base_url,
            request.symbol,
            request.lookback_days,
            request.interval.as_str()
        )
    }

    /// Parse a chart response into a (field, symbol) labelled frame.
    ///
    /// Rows where every field is missing are skipped. A response with no
    /// timestamps is an empty frame rather than an error.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<RawFrame, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let Some(timestamps) = data.timestamp else {
            return Ok(RawFrame::empty());
        };
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        let fields: [(&str, &[Option<f64>]); 5] = [
            ("Open", &quote.open),
            ("High", &quote.high),
            ("Low", &quote.low),
            ("Close", &quote.close),
            ("Volume", &quote.volume),
        ];

        let mut index = Vec::with_capacity(timestamps.len());
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(timestamps.len()); 5];
        for (i, &ts) in timestamps.iter().enumerate() {
            let row: Vec<Option<f64>> = fields
                .iter()
                .map(|(_, values)| values.get(i).copied().flatten())
                .collect();
            if row.iter().all(Option::is_none) {
                continue;
            }
            let stamp = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| DataError::InvalidTimestamp(ts.to_string()))?;
            index.push(stamp.fixed_offset());
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        debug!(symbol, rows = index.len(), "parsed chart response");
        let columns = fields
            .iter()
            .zip(columns)
            .map(|((name, _), values)| RawColumn::new(ColumnLabel::pair(*name, symbol), values))
            .collect();
        RawFrame::new(TimeIndex::Aware(index), columns)
    }
}

impl DataProvider for YahooChartProvider {
    fn name(&self) -> &str {
        "yahoo_chart"
    }

    fn fetch(&self, request: &FetchRequest) -> Result<RawFrame, DataError> {
        let url = self.chart_url(request);
        debug!(%url, "requesting chart");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: request.symbol.clone(),
            });
        }
        if !status.is_success() {
            return Err(DataError::NetworkUnreachable(format!(
                "HTTP {status} for {}",
                request.symbol
            )));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!(
                "failed to parse response for {}: {e}",
                request.symbol
            ))
        })?;
        Self::parse_response(&request.symbol, chart)
    }
}
