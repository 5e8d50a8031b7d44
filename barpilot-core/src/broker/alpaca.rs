//! Alpaca v2 REST client (blocking).

use std::time::Duration;

use reqwest::blocking::{RequestBuilder, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Broker, BrokerError};
use crate::domain::{BracketOrder, MarketClock, OrderAck, OrderSide, OrderType, Position, TimeInForce};

pub const PAPER_BASE_URL: &str = "https://paper-api.alpaca.markets";

#[derive(Clone, PartialEq, Eq)]
pub struct AlpacaCredentials {
    pub key_id: String,
    pub secret_key: String,
}

impl std::fmt::Debug for AlpacaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaCredentials")
            .field("key_id", &self.key_id)
            .field("secret_key", &"***")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct OrderRequest<'a> {
    symbol: &'a str,
    qty: String,
    side: OrderSide,
    #[serde(rename = "type")]
    order_type: OrderType,
    time_in_force: TimeInForce,
    order_class: &'static str,
    take_profit: TakeProfit,
    stop_loss: StopLoss,
}

#[derive(Debug, Serialize)]
struct TakeProfit {
    limit_price: String,
}

#[derive(Debug, Serialize)]
struct StopLoss {
    stop_price: String,
}

impl<'a> From<&'a BracketOrder> for OrderRequest<'a> {
    fn from(order: &'a BracketOrder) -> Self {
        Self {
            symbol: &order.symbol,
            qty: order.qty.to_string(),
            side: order.side,
            order_type: order.order_type,
            time_in_force: order.time_in_force,
            order_class: "bracket",
            take_profit: TakeProfit {
                limit_price: format!("{:.2}", order.take_profit_limit),
            },
            stop_loss: StopLoss {
                stop_price: format!("{:.2}", order.stop_loss_stop),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ClockResponse {
    is_open: bool,
    next_open: Option<String>,
    next_close: Option<String>,
}

/// Alpaca sends quantities and prices as decimal strings.
#[derive(Debug, Deserialize)]
struct PositionResponse {
    symbol: String,
    qty: String,
    avg_entry_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
}

pub struct AlpacaBroker {
    client: reqwest::blocking::Client,
    base_url: String,
    credentials: AlpacaCredentials,
}

impl AlpacaBroker {
    pub fn new(base_url: impl Into<String>, credentials: AlpacaCredentials) -> Result<Self, BrokerError> {
        if credentials.key_id.is_empty() {
            return Err(BrokerError::MissingCredential("ALPACA_API_KEY_ID".into()));
        }
        if credentials.secret_key.is_empty() {
            return Err(BrokerError::MissingCredential("ALPACA_API_SECRET_KEY".into()));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BrokerError::Unreachable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("APCA-API-KEY-ID", &self.credentials.key_id)
            .header("APCA-API-SECRET-KEY", &self.credentials.secret_key)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, BrokerError> {
        self.authed(request)
            .send()
            .map_err(|e| BrokerError::Unreachable(e.to_string()))
    }

    fn check(resp: Response) -> Result<Response, BrokerError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().unwrap_or_default();
        Err(BrokerError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn decode<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, BrokerError> {
        resp.json().map_err(|e| BrokerError::Decode(e.to_string()))
    }
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, BrokerError> {
    raw.parse()
        .map_err(|_| BrokerError::Decode(format!("{field} '{raw}' is not a number")))
}

fn to_position(resp: PositionResponse) -> Result<Position, BrokerError> {
    Ok(Position {
        qty: parse_decimal("qty", &resp.qty)?,
        avg_entry_price: resp
            .avg_entry_price
            .as_deref()
            .map(|p| parse_decimal("avg_entry_price", p))
            .transpose()?,
        symbol: resp.symbol,
    })
}

impl Broker for AlpacaBroker {
    fn name(&self) -> &str {
        "alpaca"
    }

    fn clock(&self) -> Result<MarketClock, BrokerError> {
        let resp = Self::check(self.send(self.client.get(self.url("/v2/clock")))?)?;
        let clock: ClockResponse = Self::decode(resp)?;
        debug!(is_open = clock.is_open, "market clock");
        Ok(MarketClock {
            is_open: clock.is_open,
            next_open: clock.next_open,
            next_close: clock.next_close,
        })
    }

    fn position(&self, symbol: &str) -> Result<Option<Position>, BrokerError> {
        let resp = self.send(self.client.get(self.url(&format!("/v2/positions/{symbol}"))))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let position = to_position(Self::decode(Self::check(resp)?)?)?;
        Ok(Some(position))
    }

    fn submit_bracket(&self, order: &BracketOrder) -> Result<OrderAck, BrokerError> {
        let body = OrderRequest::from(order);
        let resp = self.send(self.client.post(self.url("/v2/orders")).json(&body))?;
        let ack: OrderResponse = Self::decode(Self::check(resp)?)?;
        info!(id = %ack.id, status = %ack.status, "bracket order accepted");
        Ok(OrderAck {
            id: ack.id,
            status: ack.status,
        })
    }

    fn close_position(&self, symbol: &str) -> Result<OrderAck, BrokerError> {
        let resp = self.send(self.client.delete(self.url(&format!("/v2/positions/{symbol}"))))?;
        let ack: OrderResponse = Self::decode(Self::check(resp)?)?;
        info!(id = %ack.id, status = %ack.status, "close order accepted");
        Ok(OrderAck {
            id: ack.id,
            status: ack.status,
        })
    }
}
