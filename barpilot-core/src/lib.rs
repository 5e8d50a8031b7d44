//! BarPilot Core: intraday bar data, feature pipeline, policy and broker seams.
//!
//! This crate contains everything between a market-data provider and an
//! order ticket:
//! - Domain types (bars, actions, bracket orders, positions)
//! - Data providers and the normalizer (label flattening, timezone, session filter)
//! - Indicators and the feature builder (warm-up trimming, robust scaling)
//! - Observation builder (fixed-width policy input)
//! - Policy and broker traits with their HTTP clients
//! - Feature table export

pub mod broker;
pub mod config;
pub mod data;
pub mod domain;
pub mod features;
pub mod indicators;
pub mod observation;
pub mod policy;

pub use config::PipelineConfig;
pub use observation::{build_obs, InsufficientHistory, Observation};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types and the boundary clients are Send + Sync,
    /// matching the `Send + Sync` bounds on the provider, policy and broker traits.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::BarTable>();
        require_sync::<domain::BarTable>();
        require_send::<domain::BracketOrder>();
        require_sync::<domain::BracketOrder>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();

        // Pipeline
        require_send::<data::RawFrame>();
        require_sync::<data::RawFrame>();
        require_send::<data::BarNormalizer>();
        require_sync::<data::BarNormalizer>();
        require_send::<features::FeatureTable>();
        require_sync::<features::FeatureTable>();
        require_send::<features::FeatureBuilder>();
        require_sync::<features::FeatureBuilder>();
        require_send::<Observation>();
        require_sync::<Observation>();
        require_send::<PipelineConfig>();
        require_sync::<PipelineConfig>();

        // Boundary clients
        require_send::<data::YahooChartProvider>();
        require_sync::<data::YahooChartProvider>();
        require_send::<policy::HttpPolicy>();
        require_sync::<policy::HttpPolicy>();
        require_send::<broker::AlpacaBroker>();
        require_sync::<broker::AlpacaBroker>();
    }

    /// The policy only ever sees an observation, never the broker or account.
    #[test]
    fn policy_trait_takes_only_an_observation() {
        fn _check_trait_object_builds(
            policy: &dyn policy::Policy,
            observation: &Observation,
        ) -> Result<domain::Action, policy::PolicyError> {
            policy.predict(observation)
        }
    }
}
