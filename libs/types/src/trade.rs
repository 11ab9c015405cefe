//! Trade record types
//!
//! Trades are append-only: once committed they are never mutated.

use crate::ids::{OrderId, Symbol, TradeId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// A fill between one buy order and one sell order.
///
/// The execution price is the resting side's price, so it always lies
/// between the two limit prices of the matched pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: Symbol,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    pub created_at: i64, // Unix nanos
}

impl Trade {
    /// Create a new trade awaiting its repository-assigned id.
    pub fn new(
        symbol: Symbol,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            id: TradeId::UNASSIGNED,
            symbol,
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            created_at: timestamp,
        }
    }

    /// Uniqueness key under which duplicate inserts are swallowed, making
    /// replayed matching runs idempotent at the storage layer.
    pub fn idempotency_key(&self) -> (i64, i64, u64, i64) {
        (
            self.buy_order_id.as_i64(),
            self.sell_order_id.as_i64(),
            self.quantity.as_u64(),
            self.created_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade::new(
            Symbol::new("AAPL"),
            OrderId::new(1),
            OrderId::new(2),
            Price::from_u64(100),
            Quantity::new(10),
            1_700_000_000_000_000_000,
        )
    }

    #[test]
    fn test_trade_creation() {
        let trade = sample_trade();
        assert_eq!(trade.id, TradeId::UNASSIGNED);
        assert_eq!(trade.buy_order_id, OrderId::new(1));
        assert_eq!(trade.sell_order_id, OrderId::new(2));
    }

    #[test]
    fn test_idempotency_key_ignores_id() {
        let mut a = sample_trade();
        let mut b = sample_trade();
        a.id = TradeId::new(10);
        b.id = TradeId::new(11);
        assert_eq!(a.idempotency_key(), b.idempotency_key());
    }

    #[test]
    fn test_trade_serialization() {
        let trade = sample_trade();
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["price"], "100");
        assert_eq!(json["quantity"], 10);
        assert_eq!(json["buy_order_id"], 1);
    }
}
