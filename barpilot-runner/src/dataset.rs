//! Training dataset assembly.
//!
//! A dataset is the session-filtered, scaled feature table over the history
//! lookback, with the local trading date of every row. Each date is one
//! training episode.

use std::path::Path;

use barpilot_core::data::{export_features, DataError, DataProvider, DatasetFormat, ExportError};
use barpilot_core::features::{FeatureBuilder, FeatureColumn, FeatureError, FeatureTable, ScalingStats};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::AgentConfig;
use crate::data_loader::{load_bars, LoadPurpose};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("feature error: {0}")]
    Feature(#[from] FeatureError),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
    #[error("no feature rows for '{symbol}' after warm-up")]
    Empty { symbol: String },
}

/// Contiguous rows sharing one trading date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Episode {
    pub date: NaiveDate,
    /// First row index (inclusive).
    pub start: usize,
    /// Last row index (exclusive).
    pub end: usize,
}

impl Episode {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone)]
pub struct TrainingDataset {
    pub symbol: String,
    pub features: FeatureTable,
    pub stats: Vec<(FeatureColumn, ScalingStats)>,
}

impl TrainingDataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.features.dates()
    }

    /// Rows grouped by trading date, in order.
    pub fn episodes(&self) -> Vec<Episode> {
        let mut episodes: Vec<Episode> = Vec::new();
        for (row, date) in self.dates().into_iter().enumerate() {
            match episodes.last_mut() {
                Some(last) if last.date == date => last.end = row + 1,
                _ => episodes.push(Episode {
                    date,
                    start: row,
                    end: row + 1,
                }),
            }
        }
        episodes
    }

    pub fn export(&self, path: &Path, format: DatasetFormat) -> Result<(), DatasetError> {
        export_features(&self.features, path, format)?;
        info!(path = %path.display(), rows = self.len(), ?format, "dataset written");
        Ok(())
    }
}

/// Fetch the history lookback, filter to the session, and build scaled features.
pub fn load_dataset(
    config: &AgentConfig,
    provider: &dyn DataProvider,
) -> Result<TrainingDataset, DatasetError> {
    let bars = load_bars(provider, config, LoadPurpose::History)?;
    let scaled = FeatureBuilder::default().build(&bars)?;
    if scaled.table.is_empty() {
        return Err(DatasetError::Empty {
            symbol: config.symbol.clone(),
        });
    }
    let dataset = TrainingDataset {
        symbol: config.symbol.clone(),
        features: scaled.table,
        stats: scaled.stats,
    };
    info!(
        symbol = %dataset.symbol,
        rows = dataset.len(),
        episodes = dataset.episodes().len(),
        "dataset loaded"
    );
    Ok(dataset)
}
