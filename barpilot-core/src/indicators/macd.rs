//! Moving Average Convergence/Divergence (MACD).
//!
//! Three lines (separate Indicator instances):
//! - Macd: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(macd, signal)
//! - Diff: macd - signal
//!
//! Lookback: slow - 1 for the MACD line, slow + signal - 2 for signal/diff.

use super::ema::ema_of_series;
use super::{Indicator, PriceSeries};

/// Which MACD line to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Diff,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize, line: MacdLine) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD spans must be >= 1");
        assert!(fast < slow, "MACD fast span must be shorter than slow span");
        let name = match line {
            MacdLine::Macd => format!("macd_{fast}_{slow}"),
            MacdLine::Signal => format!("macd_signal_{fast}_{slow}_{signal}"),
            MacdLine::Diff => format!("macd_diff_{fast}_{slow}_{signal}"),
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name,
        }
    }

    /// The standard 12/26/9 configuration.
    pub fn standard(line: MacdLine) -> Self {
        Self::new(12, 26, 9, line)
    }
}

/// All three MACD lines for a close series.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub diff: Vec<f64>,
}

pub fn macd_lines(close: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let ema_fast = ema_of_series(close, fast);
    let ema_slow = ema_of_series(close, slow);
    let macd: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = ema_of_series(&macd, signal);
    let diff = macd.iter().zip(&signal_line).map(|(m, s)| m - s).collect();
    MacdSeries {
        macd,
        signal: signal_line,
        diff,
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal | MacdLine::Diff => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, series: &PriceSeries) -> Vec<f64> {
        let lines = macd_lines(&series.close, self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => lines.macd,
            MacdLine::Signal => lines.signal,
            MacdLine::Diff => lines.diff,
        }
    }
}
