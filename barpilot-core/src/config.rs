//! Pipeline configuration.
//!
//! Everything the feature pipeline needs is passed in explicitly through
//! `PipelineConfig`; nothing in the pipeline reads globals or the environment.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::data::session::SessionWindow;
use crate::features::{FeatureColumn, MODEL_FEATURES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Exchange timezone bars are converted to.
    pub timezone: Tz,
    /// Intraday window kept by the normalizer.
    pub session: SessionWindow,
    /// Number of feature rows per observation.
    pub window: usize,
    /// Observation columns, in order.
    pub features: Vec<FeatureColumn>,
}

impl PipelineConfig {
    /// Length of the flattened observation vector.
    pub fn observation_len(&self) -> usize {
        self.window * self.features.len()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            session: SessionWindow::default(),
            window: 48,
            features: MODEL_FEATURES.to_vec(),
        }
    }
}
