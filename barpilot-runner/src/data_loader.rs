//! Provider selection and bar loading for the runner.
//!
//! Three sources:
//! 1. Yahoo chart API (default, network)
//! 2. A local CSV file (`--csv`)
//! 3. Synthetic bars (`--synthetic`), a developer-only offline mode
//!
//! Loading does one fetch and one normalization; there is no retry and no
//! fallback between sources.

use std::path::PathBuf;

use barpilot_core::data::{
    BarNormalizer, CsvProvider, DataError, DataProvider, FetchRequest, SyntheticProvider,
    YahooChartProvider,
};
use barpilot_core::domain::BarTable;
use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::config::AgentConfig;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BarSource {
    #[default]
    Yahoo,
    Csv(PathBuf),
    /// Synthetic bars ending on `anchor` (today when `None`).
    Synthetic { anchor: Option<NaiveDate> },
}

/// Build the provider for a source.
pub fn make_provider(
    source: &BarSource,
    config: &AgentConfig,
) -> Result<Box<dyn DataProvider>, DataError> {
    Ok(match source {
        BarSource::Yahoo => Box::new(YahooChartProvider::new()?),
        BarSource::Csv(path) => Box::new(CsvProvider::new(path.clone())),
        BarSource::Synthetic { anchor } => {
            let anchor = anchor.unwrap_or_else(|| Utc::now().date_naive());
            Box::new(SyntheticProvider::new(anchor, config.pipeline.timezone))
        }
    })
}

/// Which fetch a load is for. Live loads use the short lookback and only
/// filter the session when configured to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPurpose {
    Live,
    History,
}

impl LoadPurpose {
    fn lookback_days(self, config: &AgentConfig) -> u32 {
        match self {
            LoadPurpose::Live => config.live_days,
            LoadPurpose::History => config.history_days,
        }
    }

    fn filters_session(self, config: &AgentConfig) -> bool {
        match self {
            LoadPurpose::Live => config.filter_live_session,
            LoadPurpose::History => true,
        }
    }
}

pub fn normalizer_for(purpose: LoadPurpose, config: &AgentConfig) -> BarNormalizer {
    let normalizer = BarNormalizer::new(config.pipeline.timezone);
    if purpose.filters_session(config) {
        normalizer.with_session(config.pipeline.session)
    } else {
        normalizer
    }
}

/// Fetch and normalize bars. An empty fetch is `DataError::EmptyData`.
pub fn load_bars(
    provider: &dyn DataProvider,
    config: &AgentConfig,
    purpose: LoadPurpose,
) -> Result<BarTable, DataError> {
    let request = FetchRequest::new(
        config.symbol.clone(),
        purpose.lookback_days(config),
        config.interval,
    );
    let frame = provider.fetch(&request)?;
    info!(
        provider = provider.name(),
        symbol = %request.symbol,
        days = request.lookback_days,
        rows = frame.len(),
        "fetched bars"
    );
    normalizer_for(purpose, config).normalize(&frame, &config.symbol)
}
