//! Simple returns over n rows.
//!
//! ret[t] = close[t] / close[t-n] - 1. The first n rows have no reference
//! close and are filled with 0.0, so the output has no warm-up.

use super::{Indicator, PriceSeries};

#[derive(Debug, Clone)]
pub struct Returns {
    periods: usize,
    name: String,
}

impl Returns {
    pub fn new(periods: usize) -> Self {
        assert!(periods >= 1, "return horizon must be >= 1");
        Self {
            periods,
            name: format!("ret_{periods}"),
        }
    }
}

impl Indicator for Returns {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        pct_change(&series.close, self.periods)
            .into_iter()
            .map(|v| if v.is_nan() { 0.0 } else { v })
            .collect()
    }
}

/// Percentage change over `periods` rows; NaN where there is no reference value.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i < periods {
                f64::NAN
            } else {
                values[i] / values[i - periods] - 1.0
            }
        })
        .collect()
}
