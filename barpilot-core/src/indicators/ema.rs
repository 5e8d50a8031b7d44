//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA at the first defined input equals that input.
//! Leading NaN inputs are skipped; the output is defined once `span` inputs
//! have been seen. Lookback: span - 1 on a series without leading NaN.

use super::{Indicator, PriceSeries};

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.span.saturating_sub(1)
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        ema_of_series(&series.close, self.span)
    }
}

/// Span-parameterized EMA of an arbitrary series.
/// Used by composed indicators (MACD signal line) that need the EMA of a derived series.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }
    recursive_average(values, 2.0 / (span as f64 + 1.0), span)
}

/// Recursive exponential average with smoothing factor `alpha`.
///
/// Starts at the first non-NaN input (seeded with that input) and reports
/// values from the `min_periods`-th observation on. A NaN after the start
/// taints the rest of the output.
pub fn recursive_average(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let mut prev = values[start];
    let mut seen = 1usize;
    if seen >= min_periods {
        result[start] = prev;
    }

    for i in (start + 1)..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        seen += 1;
        if seen >= min_periods {
            result[i] = prev;
        }
    }

    result
}
