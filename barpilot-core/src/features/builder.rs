//! Feature builder: indicators, warm-up trimming, robust scaling.
//!
//! Raw columns are computed over the full bar table, rows with any undefined
//! value are dropped, then the modeling columns are scaled against the rows
//! that remain.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::column::{FeatureColumn, MODEL_FEATURES};
use super::scaling::{RobustScaler, ScalingStats};
use super::table::FeatureTable;
use crate::domain::BarTable;
use crate::indicators::{
    Atr, Indicator, Macd, MacdLine, PriceSeries, Returns, RollingZScore, Rsi, Sma,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeatureError {
    #[error("data shape: column '{column}' is required for features")]
    MissingColumn { column: String },
}

/// Scaled feature table plus the statistics fitted for each scaled column.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatures {
    pub table: FeatureTable,
    pub stats: Vec<(FeatureColumn, ScalingStats)>,
}

impl ScaledFeatures {
    pub fn stats_for(&self, column: FeatureColumn) -> Option<&ScalingStats> {
        self.stats.iter().find(|(c, _)| *c == column).map(|(_, s)| s)
    }
}

/// Summary of a build, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub input_rows: usize,
    pub warmup_dropped: usize,
    pub output_rows: usize,
}

#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    scaler: RobustScaler,
    scaled: Vec<FeatureColumn>,
}

impl FeatureBuilder {
    pub fn new(scaler: RobustScaler, scaled: Vec<FeatureColumn>) -> Self {
        Self { scaler, scaled }
    }

    /// Every derived column over every bar, unscaled. Warm-up rows hold NaN.
    pub fn compute_raw(&self, bars: &BarTable) -> Result<FeatureTable, FeatureError> {
        let series = PriceSeries::from_table(bars).ok_or_else(|| FeatureError::MissingColumn {
            column: "close".into(),
        })?;

        let run = |indicator: &dyn Indicator| indicator.compute(&series);
        let ma_10 = run(&Sma::new(10));
        let ma_20 = run(&Sma::new(20));
        let ratio = |ma: &[f64]| -> Vec<f64> {
            series.close.iter().zip(ma).map(|(c, m)| c / m).collect()
        };
        let ma_ratio_10 = ratio(&ma_10);
        let ma_ratio_20 = ratio(&ma_20);

        let derived = vec![
            (FeatureColumn::Ret1, run(&Returns::new(1))),
            (FeatureColumn::Ret5, run(&Returns::new(5))),
            (FeatureColumn::Ret20, run(&Returns::new(20))),
            (FeatureColumn::Ma10, ma_10),
            (FeatureColumn::Ma20, ma_20),
            (FeatureColumn::MaRatio10, ma_ratio_10),
            (FeatureColumn::MaRatio20, ma_ratio_20),
            (FeatureColumn::Rsi14, run(&Rsi::new(14))),
            (FeatureColumn::Macd, run(&Macd::standard(MacdLine::Macd))),
            (FeatureColumn::MacdSig, run(&Macd::standard(MacdLine::Signal))),
            (FeatureColumn::MacdDiff, run(&Macd::standard(MacdLine::Diff))),
            (FeatureColumn::Atr, run(&Atr::new(14))),
            (FeatureColumn::VolZ, run(&RollingZScore::new(50, 1e-8))),
        ];

        Ok(FeatureTable::new(bars.clone(), derived))
    }

    /// Drop every row holding a non-finite value in any column.
    pub fn drop_incomplete(table: &FeatureTable) -> FeatureTable {
        let keep: Vec<bool> = (0..table.len()).map(|i| table.row_is_finite(i)).collect();
        table.retain_rows(&keep)
    }

    /// Raw features with warm-up rows dropped, not yet scaled.
    pub fn build_unscaled(&self, bars: &BarTable) -> Result<FeatureTable, FeatureError> {
        let raw = self.compute_raw(bars)?;
        Ok(Self::drop_incomplete(&raw))
    }

    pub fn build(&self, bars: &BarTable) -> Result<ScaledFeatures, FeatureError> {
        let raw = self.compute_raw(bars)?;
        let mut table = Self::drop_incomplete(&raw);
        let summary = BuildSummary {
            input_rows: raw.len(),
            warmup_dropped: raw.len() - table.len(),
            output_rows: table.len(),
        };
        debug!(?summary, "features computed");

        let mut stats = Vec::with_capacity(self.scaled.len());
        for column in &self.scaled {
            let Some(values) = table.column_mut(*column) else {
                continue;
            };
            if let Some(fitted) = self.scaler.fit_transform(values) {
                debug!(%column, median = fitted.median, iqr = fitted.iqr(), "scaled");
                stats.push((*column, fitted));
            }
        }
        Ok(ScaledFeatures { table, stats })
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new(RobustScaler::default(), MODEL_FEATURES.to_vec())
    }
}

/// Derive, trim and scale the default feature set.
pub fn add_features(bars: &BarTable) -> Result<FeatureTable, FeatureError> {
    FeatureBuilder::default().build(bars).map(|scaled| scaled.table)
}
