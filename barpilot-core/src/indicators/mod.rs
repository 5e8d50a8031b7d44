//! Indicator implementations.
//!
//! Indicators are pure functions: price history in, numeric series out, same
//! length as the input. Undefined warm-up values are `f64::NAN`. No value at
//! row t depends on rows after t.
//!
//! Multi-series indicators (MACD) are exposed as separate named instances per
//! line, keeping the single-series `Indicator` trait unchanged.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod returns;
pub mod rsi;
pub mod sma;
pub mod zscore;

pub use atr::Atr;
pub use ema::Ema;
pub use macd::{Macd, MacdLine};
pub use returns::Returns;
pub use rsi::Rsi;
pub use sma::Sma;
pub use zscore::RollingZScore;

use crate::domain::{BarTable, OhlcvField};

/// Price columns the indicators read, with every column resolved.
///
/// Missing high/low fall back to close; missing volume is all zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl PriceSeries {
    /// `None` if the table has no close column.
    pub fn from_table(table: &BarTable) -> Option<Self> {
        let close = table.column(OhlcvField::Close)?.to_vec();
        let or_close = |field| {
            table
                .column(field)
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| close.clone())
        };
        Some(Self {
            high: or_close(OhlcvField::High),
            low: or_close(OhlcvField::Low),
            volume: table
                .column(OhlcvField::Volume)
                .map(<[f64]>::to_vec)
                .unwrap_or_else(|| vec![0.0; close.len()]),
            close,
        })
    }

    /// Series built from closes alone.
    pub fn from_closes(closes: &[f64]) -> Self {
        Self {
            high: closes.to_vec(),
            low: closes.to_vec(),
            close: closes.to_vec(),
            volume: vec![0.0; closes.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at row t may depend on price data from row t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "atr_14").
    fn name(&self) -> &str;

    /// Index of the first row that can be defined.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole series. Output length equals input length.
    fn compute(&self, series: &PriceSeries) -> Vec<f64>;
}

/// Synthetic series from close prices for testing.
///
/// high = close + 1, low = close - 1, volume = 1000.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries {
        high: closes.iter().map(|c| c + 1.0).collect(),
        low: closes.iter().map(|c| c - 1.0).collect(),
        close: closes.to_vec(),
        volume: vec![1000.0; closes.len()],
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn price_series_falls_back_to_close_and_zero_volume() {
        let t0 = New_York.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let t1 = New_York.with_ymd_and_hms(2024, 3, 4, 10, 5, 0).unwrap();
        let table =
            BarTable::new(vec![t0, t1], vec![(OhlcvField::Close, vec![1.0, 2.0])]).unwrap();
        let series = PriceSeries::from_table(&table).unwrap();
        assert_eq!(series.high, vec![1.0, 2.0]);
        assert_eq!(series.low, vec![1.0, 2.0]);
        assert_eq!(series.volume, vec![0.0, 0.0]);
    }

    #[test]
    fn price_series_requires_close() {
        let t0 = New_York.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let table = BarTable::new(vec![t0], vec![(OhlcvField::Open, vec![1.0])]).unwrap();
        assert!(PriceSeries::from_table(&table).is_none());
    }
}
