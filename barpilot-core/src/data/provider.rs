//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo chart API, CSV
//! import, synthetic bars) so we can swap implementations and mock for tests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::frame::RawFrame;

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output and log lines.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("empty data for '{symbol}'; try another symbol, lookback or interval")]
    EmptyData { symbol: String },

    #[error("no OHLCV columns found after normalization (columns: {found})")]
    MissingCanonicalColumns { found: String },

    #[error("column '{column}' is present more than once after normalization")]
    DuplicateColumn { column: String },

    #[error("malformed frame: {0}")]
    Shape(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("csv import error: {0}")]
    Csv(String),
}

impl DataError {
    /// Whether the error describes a table that cannot be shaped into OHLCV bars.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            DataError::MissingCanonicalColumns { .. }
                | DataError::DuplicateColumn { .. }
                | DataError::Shape(_)
        )
    }
}

/// Bar interval for intraday requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[default]
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
}

impl BarInterval {
    /// Interval string understood by the chart API.
    pub fn as_str(self) -> &'static str {
        match self {
            BarInterval::OneMinute => "1m",
            BarInterval::FiveMinutes => "5m",
            BarInterval::FifteenMinutes => "15m",
            BarInterval::ThirtyMinutes => "30m",
            BarInterval::OneHour => "1h",
        }
    }

    pub fn minutes(self) -> u32 {
        match self {
            BarInterval::OneMinute => 1,
            BarInterval::FiveMinutes => 5,
            BarInterval::FifteenMinutes => 15,
            BarInterval::ThirtyMinutes => 30,
            BarInterval::OneHour => 60,
        }
    }
}

impl std::str::FromStr for BarInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(BarInterval::OneMinute),
            "5m" => Ok(BarInterval::FiveMinutes),
            "15m" => Ok(BarInterval::FifteenMinutes),
            "30m" => Ok(BarInterval::ThirtyMinutes),
            "1h" | "60m" => Ok(BarInterval::OneHour),
            other => Err(format!("unsupported bar interval '{other}'")),
        }
    }
}

/// What to fetch: one symbol, a trailing number of calendar days, one interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub lookback_days: u32,
    pub interval: BarInterval,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, lookback_days: u32, interval: BarInterval) -> Self {
        Self {
            symbol: symbol.into(),
            lookback_days,
            interval,
        }
    }
}

/// Trait for market-data providers.
///
/// Providers return the frame exactly as the source shapes it (possibly with
/// two-level labels and naive timestamps); the normalizer does the rest.
/// An empty frame is a valid return value; callers turn it into
/// `DataError::EmptyData`.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch intraday bars for the request.
    fn fetch(&self, request: &FetchRequest) -> Result<RawFrame, DataError>;
}
