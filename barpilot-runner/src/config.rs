//! Agent configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file is a valid
//! configuration for the SPY 5-minute long/flat agent. Broker credentials and
//! endpoint overrides come from the environment (after loading `.env`).

use std::path::Path;

use barpilot_core::broker::{AlpacaCredentials, PAPER_BASE_URL};
use barpilot_core::data::BarInterval;
use barpilot_core::domain::RiskLimits;
use barpilot_core::PipelineConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const ENV_KEY_ID: &str = "ALPACA_API_KEY_ID";
pub const ENV_SECRET_KEY: &str = "ALPACA_API_SECRET_KEY";
pub const ENV_BASE_URL: &str = "ALPACA_BASE_URL";
pub const ENV_POLICY_URL: &str = "BARPILOT_POLICY_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub symbol: String,
    /// Shares per entry.
    pub qty: u32,
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    /// Days of bars fetched for the training dataset.
    pub history_days: u32,
    /// Days of bars fetched on each tick.
    pub live_days: u32,
    pub interval: BarInterval,
    /// Apply the session window on the live path too.
    pub filter_live_session: bool,
    pub policy_url: String,
    pub broker_base_url: String,
    /// Log orders instead of sending them.
    pub dry_run: bool,
    pub pipeline: PipelineConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".into(),
            qty: 1,
            take_profit_pct: RiskLimits::default().take_profit_pct,
            stop_loss_pct: RiskLimits::default().stop_loss_pct,
            history_days: 60,
            live_days: 3,
            interval: BarInterval::FiveMinutes,
            filter_live_session: false,
            policy_url: "http://127.0.0.1:8000/predict".into(),
            broker_base_url: PAPER_BASE_URL.into(),
            dry_run: false,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn risk(&self) -> RiskLimits {
        RiskLimits {
            take_profit_pct: self.take_profit_pct,
            stop_loss_pct: self.stop_loss_pct,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.symbol.trim().is_empty() {
            return invalid("symbol is empty".into());
        }
        if self.qty == 0 {
            return invalid("qty must be positive".into());
        }
        for (name, pct) in [
            ("take_profit_pct", self.take_profit_pct),
            ("stop_loss_pct", self.stop_loss_pct),
        ] {
            if !(pct > 0.0 && pct < 1.0) {
                return invalid(format!("{name} must be in (0, 1), got {pct}"));
            }
        }
        if self.live_days == 0 || self.history_days == 0 {
            return invalid("lookback days must be positive".into());
        }
        if self.pipeline.window == 0 {
            return invalid("pipeline.window must be positive".into());
        }
        if self.pipeline.features.is_empty() {
            return invalid("pipeline.features is empty".into());
        }
        let session = &self.pipeline.session;
        if session.start >= session.end {
            return invalid(format!(
                "session start {} is not before end {}",
                session.start, session.end
            ));
        }
        Ok(())
    }

    /// Apply `BARPILOT_POLICY_URL` and `ALPACA_BASE_URL` overrides.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_POLICY_URL).filter(|v| !v.is_empty()) {
            debug!(%url, "policy endpoint from environment");
            self.policy_url = url;
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            debug!(%url, "broker endpoint from environment");
            self.broker_base_url = url;
        }
    }
}

/// Broker credentials from `lookup`.
pub fn credentials_with<F>(lookup: F) -> Result<AlpacaCredentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &'static str| {
        lookup(name)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEnv(name))
    };
    Ok(AlpacaCredentials {
        key_id: get(ENV_KEY_ID)?,
        secret_key: get(ENV_SECRET_KEY)?,
    })
}

/// Load `.env` (if present) into the process environment.
pub fn load_dotenv() {
    if let Ok(path) = dotenv::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
}

/// Lookup against the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
