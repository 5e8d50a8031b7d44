//! Read-through, write-suppressing broker wrapper.

use tracing::info;

use super::{Broker, BrokerError};
use crate::domain::{BracketOrder, MarketClock, OrderAck, Position};

/// Delegates clock and position reads to the inner broker; order submission
/// and position closes are logged and acknowledged locally.
pub struct DryRunBroker<B> {
    inner: B,
}

impl<B: Broker> DryRunBroker<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: Broker> Broker for DryRunBroker<B> {
    fn name(&self) -> &str {
        "dry_run"
    }

    fn clock(&self) -> Result<MarketClock, BrokerError> {
        self.inner.clock()
    }

    fn position(&self, symbol: &str) -> Result<Option<Position>, BrokerError> {
        self.inner.position(symbol)
    }

    fn submit_bracket(&self, order: &BracketOrder) -> Result<OrderAck, BrokerError> {
        info!(
            symbol = %order.symbol,
            qty = order.qty,
            take_profit = order.take_profit_limit,
            stop_loss = order.stop_loss_stop,
            "dry run: bracket order not sent"
        );
        Ok(OrderAck {
            id: "dry-run".into(),
            status: "not_sent".into(),
        })
    }

    fn close_position(&self, symbol: &str) -> Result<OrderAck, BrokerError> {
        info!(symbol, "dry run: close not sent");
        Ok(OrderAck {
            id: "dry-run".into(),
            status: "not_sent".into(),
        })
    }
}

/// Broker with no account behind it: market always open, always flat.
/// Paired with `DryRunBroker` for fully offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBroker;

impl Broker for OfflineBroker {
    fn name(&self) -> &str {
        "offline"
    }

    fn clock(&self) -> Result<MarketClock, BrokerError> {
        Ok(MarketClock {
            is_open: true,
            next_open: None,
            next_close: None,
        })
    }

    fn position(&self, _symbol: &str) -> Result<Option<Position>, BrokerError> {
        Ok(None)
    }

    fn submit_bracket(&self, _order: &BracketOrder) -> Result<OrderAck, BrokerError> {
        Err(BrokerError::Unreachable("offline broker cannot place orders".into()))
    }

    fn close_position(&self, _symbol: &str) -> Result<OrderAck, BrokerError> {
        Err(BrokerError::Unreachable("offline broker cannot close positions".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskLimits;

    #[test]
    fn writes_are_suppressed() {
        let broker = DryRunBroker::new(OfflineBroker);
        let order = BracketOrder::long_entry("SPY", 1, 500.0, &RiskLimits::default());
        let ack = broker.submit_bracket(&order).unwrap();
        assert_eq!(ack.status, "not_sent");
        assert_eq!(broker.close_position("SPY").unwrap().id, "dry-run");
    }

    #[test]
    fn reads_are_delegated() {
        let broker = DryRunBroker::new(OfflineBroker);
        assert!(broker.clock().unwrap().is_open);
        assert_eq!(broker.position("SPY").unwrap(), None);
    }

    #[test]
    fn offline_broker_refuses_writes() {
        let order = BracketOrder::long_entry("SPY", 1, 500.0, &RiskLimits::default());
        assert!(OfflineBroker.submit_bracket(&order).is_err());
    }
}
