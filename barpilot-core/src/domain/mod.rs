//! Domain types for BarPilot

pub mod action;
pub mod bar;
pub mod order;

pub use action::Action;
pub use bar::{BarError, BarTable, OhlcvField};
pub use order::{
    round_cents, BracketOrder, MarketClock, OrderAck, OrderSide, OrderType, Position, RiskLimits,
    TimeInForce,
};

/// Symbol type alias
pub type Symbol = String;
