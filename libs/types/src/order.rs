//! Order lifecycle types
//!
//! An order is either a limit order carrying a price or a market order
//! carrying none; the distinction is a tagged variant so "no price means
//! market" holds at the type level instead of by convention.

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Wire-level order type tag used on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

/// Pricing variant of an order.
///
/// Serialized inline into the order body as `type` plus an optional
/// `price`, so a market order simply omits the price field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OrderKind {
    Limit { price: Price },
    Market,
}

impl OrderKind {
    /// Limit price, if the order carries one.
    pub fn price(&self) -> Option<Price> {
        match self {
            OrderKind::Limit { price } => Some(*price),
            OrderKind::Market => None,
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(self, OrderKind::Market)
    }
}

/// Order status.
///
/// `Filled` and `Canceled` are terminal: once reached, no further
/// mutation of the order is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Canceled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Canceled)
    }

    /// Active orders are the ones that participate in the book.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::PartiallyFilled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Open => "open",
            OrderStatus::PartiallyFilled => "partially_filled",
            OrderStatus::Filled => "filled",
            OrderStatus::Canceled => "canceled",
        };
        write!(f, "{}", name)
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    #[serde(flatten)]
    pub kind: OrderKind,
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    /// Create a new open order awaiting its repository-assigned id.
    pub fn new(symbol: Symbol, side: Side, kind: OrderKind, quantity: Quantity, timestamp: i64) -> Self {
        Self {
            id: OrderId::UNASSIGNED,
            symbol,
            side,
            kind,
            quantity,
            remaining_quantity: quantity,
            status: OrderStatus::Open,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Limit price, if any.
    pub fn price(&self) -> Option<Price> {
        self.kind.price()
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Quantity filled so far across all trades.
    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    /// Record a fill against this order and adjust the status.
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity.
    pub fn add_fill(&mut self, fill_quantity: Quantity, timestamp: i64) {
        assert!(
            fill_quantity <= self.remaining_quantity,
            "Fill would exceed remaining quantity"
        );

        self.remaining_quantity = self.remaining_quantity - fill_quantity;
        self.status = if self.remaining_quantity.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = timestamp;
    }

    /// Cancel the order. The remaining quantity is left untouched so the
    /// partial-fill history stays auditable.
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state.
    pub fn cancel(&mut self, timestamp: i64) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");

        self.status = OrderStatus::Canceled;
        self.updated_at = timestamp;
    }
}

/// Raw submission payload, validated by the engine facade before an
/// `Order` is constructed from it.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub price: Option<rust_decimal::Decimal>,
    pub quantity: i64,
}
