//! One agent tick: clock → bars → features → observation → policy → order.
//!
//! Soft skips (market closed, no data, short history) are outcomes, not
//! errors. Provider, policy and order-submission failures propagate. Clock and
//! position query failures are logged and treated as "open" and "flat".

use barpilot_core::broker::{Broker, BrokerError};
use barpilot_core::data::{DataError, DataProvider};
use barpilot_core::domain::{Action, BracketOrder, OrderAck};
use barpilot_core::features::{FeatureBuilder, FeatureError};
use barpilot_core::policy::{Policy, PolicyError};
use barpilot_core::{build_obs, InsufficientHistory};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::data_loader::{load_bars, LoadPurpose};

#[derive(Debug, Error)]
pub enum TickError {
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("feature error: {0}")]
    Feature(#[from] FeatureError),
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    MarketClosed,
    NoData,
    InsufficientHistory { available: usize, required: usize },
    Held { action: Action, has_long: bool },
    Entered { order: BracketOrder, ack: OrderAck },
    Flattened { ack: OrderAck },
}

impl From<InsufficientHistory> for TickOutcome {
    fn from(e: InsufficientHistory) -> Self {
        TickOutcome::InsufficientHistory {
            available: e.available,
            required: e.required,
        }
    }
}

impl std::fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TickOutcome::MarketClosed => write!(f, "market closed, skipped"),
            TickOutcome::NoData => write!(f, "no data"),
            TickOutcome::InsufficientHistory { available, required } => {
                write!(f, "not enough history ({available}/{required} rows)")
            }
            TickOutcome::Held { action, has_long } => {
                write!(f, "hold (policy said {action}, long: {has_long})")
            }
            TickOutcome::Entered { order, .. } => write!(
                f,
                "buy {} {} TP={:.2} SL={:.2}",
                order.qty, order.symbol, order.take_profit_limit, order.stop_loss_stop
            ),
            TickOutcome::Flattened { .. } => write!(f, "close position"),
        }
    }
}

pub fn run_tick(
    config: &AgentConfig,
    provider: &dyn DataProvider,
    policy: &dyn Policy,
    broker: &dyn Broker,
) -> Result<TickOutcome, TickError> {
    match broker.clock() {
        Ok(clock) if !clock.is_open => {
            info!(next_open = ?clock.next_open, "market closed");
            return Ok(TickOutcome::MarketClosed);
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "market clock unavailable, continuing"),
    }

    let bars = match load_bars(provider, config, LoadPurpose::Live) {
        Ok(bars) => bars,
        Err(DataError::EmptyData { symbol }) => {
            info!(%symbol, "no data");
            return Ok(TickOutcome::NoData);
        }
        Err(e) => return Err(e.into()),
    };

    let features = FeatureBuilder::default().build(&bars)?.table;
    let observation = match build_obs(&features, config.pipeline.window, &config.pipeline.features) {
        Ok(obs) => obs,
        Err(short) => {
            info!(available = short.available, required = short.required, "not enough history");
            return Ok(short.into());
        }
    };

    let has_long = match broker.position(&config.symbol) {
        Ok(position) => position.is_some_and(|p| p.is_long()),
        Err(e) => {
            info!(error = %e, "position unavailable, assuming flat");
            false
        }
    };

    let action = policy.predict(&observation)?;
    info!(
        %action,
        has_long,
        last_close = observation.last_close,
        at = %observation.last_timestamp,
        "policy decision"
    );

    match action {
        Action::EnterLong if !has_long => {
            let order = BracketOrder::long_entry(
                config.symbol.clone(),
                config.qty,
                observation.last_close,
                &config.risk(),
            );
            info!(
                symbol = %order.symbol,
                qty = order.qty,
                take_profit = order.take_profit_limit,
                stop_loss = order.stop_loss_stop,
                "submitting bracket"
            );
            let ack = broker.submit_bracket(&order)?;
            Ok(TickOutcome::Entered { order, ack })
        }
        Action::Flatten if has_long => {
            info!(symbol = %config.symbol, "closing position");
            let ack = broker.close_position(&config.symbol)?;
            Ok(TickOutcome::Flattened { ack })
        }
        _ => Ok(TickOutcome::Held { action, has_long }),
    }
}
