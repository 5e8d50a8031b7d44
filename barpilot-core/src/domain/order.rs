//! Order and account types exchanged with the brokerage.

use serde::{Deserialize, Serialize};

use super::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
}

/// Take-profit and stop-loss distances as fractions of the entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            take_profit_pct: 0.012,
            stop_loss_pct: 0.008,
        }
    }
}

/// Market entry with attached take-profit limit and stop-loss stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketOrder {
    pub symbol: Symbol,
    pub qty: u32,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    pub take_profit_limit: f64,
    pub stop_loss_stop: f64,
}

impl BracketOrder {
    /// Long entry priced off the last close: exits at `last × (1 ± pct)`, rounded to cents.
    pub fn long_entry(symbol: impl Into<Symbol>, qty: u32, last_price: f64, risk: &RiskLimits) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::Day,
            take_profit_limit: round_cents(last_price * (1.0 + risk.take_profit_pct)),
            stop_loss_stop: round_cents(last_price * (1.0 - risk.stop_loss_pct)),
        }
    }
}

/// Round a price to two decimals.
pub fn round_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Open position as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub qty: f64,
    pub avg_entry_price: Option<f64>,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.qty > 0.0
    }
}

/// Market session status as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketClock {
    pub is_open: bool,
    pub next_open: Option<String>,
    pub next_close: Option<String>,
}

/// Broker acknowledgement of an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub id: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_entry_prices_bracket_from_last_close() {
        let order = BracketOrder::long_entry("SPY", 1, 500.0, &RiskLimits::default());
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.time_in_force, TimeInForce::Day);
        assert_eq!(order.take_profit_limit, 506.0);
        assert_eq!(order.stop_loss_stop, 496.0);
    }

    #[test]
    fn bracket_prices_round_to_cents() {
        let order = BracketOrder::long_entry("SPY", 2, 512.337, &RiskLimits::default());
        // 512.337 * 1.012 = 518.485044, 512.337 * 0.992 = 508.238304
        assert_eq!(order.take_profit_limit, 518.49);
        assert_eq!(order.stop_loss_stop, 508.24);
        assert!(order.take_profit_limit > order.stop_loss_stop);
    }

    #[test]
    fn position_direction() {
        let mut pos = Position {
            symbol: "SPY".into(),
            qty: 3.0,
            avg_entry_price: Some(500.0),
        };
        assert!(pos.is_long());
        pos.qty = -1.0;
        assert!(!pos.is_long());
    }
}
