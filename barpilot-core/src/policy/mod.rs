//! Policy seam: observation in, discrete action out.
//!
//! The trained model lives outside this process; `HttpPolicy` queries it over
//! HTTP. Tests and offline runs plug in their own `Policy` implementations.

pub mod http;

pub use http::HttpPolicy;

use thiserror::Error;

use crate::domain::Action;
use crate::observation::Observation;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("policy returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("policy response could not be decoded: {0}")]
    Decode(String),

    #[error("policy returned unknown action code {0}")]
    UnknownAction(i64),

    #[error("observation has {actual} values, policy expects {expected}")]
    ObservationLength { expected: usize, actual: usize },
}

pub trait Policy: Send + Sync {
    fn name(&self) -> &str;

    /// Deterministic action for one observation.
    fn predict(&self, observation: &Observation) -> Result<Action, PolicyError>;
}

/// A policy that always answers with the same action.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub Action);

impl Policy for FixedPolicy {
    fn name(&self) -> &str {
        "fixed"
    }

    fn predict(&self, _observation: &Observation) -> Result<Action, PolicyError> {
        Ok(self.0)
    }
}
