//! Brokerage seam.
//!
//! Four calls: market clock, position query, bracket submission and position
//! close. `AlpacaBroker` talks to the Alpaca v2 REST API; `DryRunBroker`
//! wraps any broker and turns the write calls into log lines.

pub mod alpaca;
pub mod dry_run;

pub use alpaca::{AlpacaBroker, AlpacaCredentials, PAPER_BASE_URL};
pub use dry_run::{DryRunBroker, OfflineBroker};

use thiserror::Error;

use crate::domain::{BracketOrder, MarketClock, OrderAck, Position};

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unreachable: {0}")]
    Unreachable(String),

    #[error("broker rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("broker response could not be decoded: {0}")]
    Decode(String),

    #[error("missing broker credential: {0}")]
    MissingCredential(String),
}

pub trait Broker: Send + Sync {
    fn name(&self) -> &str;

    fn clock(&self) -> Result<MarketClock, BrokerError>;

    /// Current position in `symbol`, `None` when flat.
    fn position(&self, symbol: &str) -> Result<Option<Position>, BrokerError>;

    fn submit_bracket(&self, order: &BracketOrder) -> Result<OrderAck, BrokerError>;

    fn close_position(&self, symbol: &str) -> Result<OrderAck, BrokerError>;
}
