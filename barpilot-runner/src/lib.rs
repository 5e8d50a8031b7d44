//! BarPilot Runner: agent orchestration on top of `barpilot-core`.
//!
//! This crate provides:
//! - Agent configuration (TOML file, `.env` and environment overrides)
//! - Provider selection and bar loading for live and history fetches
//! - The one-shot trading tick
//! - Training dataset assembly and export

pub mod config;
pub mod data_loader;
pub mod dataset;
pub mod tick;

pub use config::{credentials_with, load_dotenv, process_env, AgentConfig, ConfigError};
pub use data_loader::{load_bars, make_provider, BarSource, LoadPurpose};
pub use dataset::{load_dataset, DatasetError, Episode, TrainingDataset};
pub use tick::{run_tick, TickError, TickOutcome};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<AgentConfig>();
        assert_sync::<AgentConfig>();
    }

    #[test]
    fn tick_outcome_is_send_sync() {
        assert_send::<TickOutcome>();
        assert_sync::<TickOutcome>();
    }

    #[test]
    fn dataset_is_send_sync() {
        assert_send::<TrainingDataset>();
        assert_sync::<TrainingDataset>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<TickError>();
        assert_sync::<TickError>();
        assert_send::<DatasetError>();
        assert_sync::<DatasetError>();
    }
}
