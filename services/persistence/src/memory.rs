//! In-process reference backend
//!
//! Keeps orders and trades in maps behind a single lock. Transactions
//! stage their writes locally and apply them under the lock at commit,
//! so readers never observe a partially applied submission.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use types::errors::EngineError;
use types::ids::{OrderId, Symbol, TradeId};
use types::order::Order;
use types::trade::Trade;

use crate::store::{Store, BOOK_DEPTH};

type TradeKey = (i64, i64, u64, i64);

#[derive(Default)]
struct State {
    orders: HashMap<i64, Order>,
    trades: Vec<Trade>,
    trade_keys: HashMap<TradeKey, TradeId>,
}

/// In-memory repository with the same transactional contract as the
/// relational backend.
pub struct MemoryStore {
    state: Mutex<State>,
    next_order_id: AtomicI64,
    next_trade_id: AtomicI64,
}

/// Staged writes for one transaction. Dropping the handle discards them.
#[derive(Default)]
pub struct MemoryTx {
    inserts: Vec<Order>,
    updates: Vec<Order>,
    trades: Vec<Trade>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_order_id: AtomicI64::new(1),
            next_trade_id: AtomicI64::new(1),
        }
    }
}

/// Inspection ordering for the truncated book view: best price first,
/// unpriced (market) rows last, earlier arrivals ahead of later ones.
fn surface_priority(a: &Order, b: &Order) -> CmpOrdering {
    let by_price = match (a.price(), b.price()) {
        (Some(pa), Some(pb)) => pb.cmp(&pa),
        (None, Some(_)) => CmpOrdering::Greater,
        (Some(_), None) => CmpOrdering::Less,
        (None, None) => CmpOrdering::Equal,
    };
    by_price
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<Self::Tx, EngineError> {
        Ok(MemoryTx::default())
    }

    async fn insert_order(&self, tx: &mut Self::Tx, order: &Order) -> Result<OrderId, EngineError> {
        let id = OrderId::new(self.next_order_id.fetch_add(1, Ordering::Relaxed));
        let mut row = order.clone();
        row.id = id;
        tx.inserts.push(row);
        Ok(id)
    }

    async fn update_order(&self, tx: &mut Self::Tx, order: &Order) -> Result<(), EngineError> {
        if !order.id.is_assigned() {
            return Err(EngineError::Internal(format!(
                "update for unassigned order id on symbol {}",
                order.symbol
            )));
        }
        tx.updates.push(order.clone());
        Ok(())
    }

    async fn insert_trade(&self, tx: &mut Self::Tx, trade: &Trade) -> Result<TradeId, EngineError> {
        let key = trade.idempotency_key();

        if let Some(staged) = tx.trades.iter().find(|t| t.idempotency_key() == key) {
            tracing::warn!(
                buy_order_id = %trade.buy_order_id,
                sell_order_id = %trade.sell_order_id,
                "duplicate trade insert ignored"
            );
            return Ok(staged.id);
        }
        if let Some(existing) = self.state.lock().trade_keys.get(&key) {
            tracing::warn!(
                buy_order_id = %trade.buy_order_id,
                sell_order_id = %trade.sell_order_id,
                "duplicate trade insert ignored"
            );
            return Ok(*existing);
        }

        let id = TradeId::new(self.next_trade_id.fetch_add(1, Ordering::Relaxed));
        let mut row = trade.clone();
        row.id = id;
        tx.trades.push(row);
        Ok(id)
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), EngineError> {
        let mut state = self.state.lock();

        // Reject the whole batch before touching anything, so a bad
        // update cannot leave a half-applied commit behind.
        for update in &tx.updates {
            let staged = tx.inserts.iter().any(|o| o.id == update.id);
            if !staged && !state.orders.contains_key(&update.id.as_i64()) {
                return Err(EngineError::Internal(format!(
                    "update for unknown order {}",
                    update.id
                )));
            }
        }

        for order in tx.inserts {
            state.orders.insert(order.id.as_i64(), order);
        }
        for update in tx.updates {
            if let Some(row) = state.orders.get_mut(&update.id.as_i64()) {
                row.remaining_quantity = update.remaining_quantity;
                row.status = update.status;
                row.updated_at = update.updated_at;
            }
        }
        for trade in tx.trades {
            state.trade_keys.insert(trade.idempotency_key(), trade.id);
            state.trades.push(trade);
        }
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), EngineError> {
        drop(tx);
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, EngineError> {
        Ok(self.state.lock().orders.get(&id.as_i64()).cloned())
    }

    async fn active_book(&self, symbol: &Symbol, full: bool) -> Result<Vec<Order>, EngineError> {
        let mut rows: Vec<Order> = self
            .state
            .lock()
            .orders
            .values()
            .filter(|o| o.symbol == *symbol && o.is_active())
            .cloned()
            .collect();

        if full {
            rows.sort_by_key(|o| o.id);
        } else {
            rows.sort_by(surface_priority);
            rows.truncate(BOOK_DEPTH);
        }
        Ok(rows)
    }

    async fn trades(&self, symbol: Option<&Symbol>) -> Result<Vec<Trade>, EngineError> {
        let state = self.state.lock();
        Ok(state
            .trades
            .iter()
            .filter(|t| symbol.map_or(true, |s| t.symbol == *s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::{Price, Quantity};
    use types::order::{OrderKind, Side};

    fn limit(symbol: &str, side: Side, price: u64, quantity: u64, ts: i64) -> Order {
        Order::new(
            Symbol::new(symbol),
            side,
            OrderKind::Limit {
                price: Price::from_u64(price),
            },
            Quantity::new(quantity),
            ts,
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_monotonic_ids() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let first = store
            .insert_order(&mut tx, &limit("AAPL", Side::Buy, 100, 10, 1))
            .await
            .unwrap();
        let second = store
            .insert_order(&mut tx, &limit("AAPL", Side::Sell, 101, 5, 2))
            .await
            .unwrap();

        assert!(second > first);
        store.commit(tx).await.unwrap();

        assert!(store.get_order(first).await.unwrap().is_some());
        assert!(store.get_order(second).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_invisible() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let id = store
            .insert_order(&mut tx, &limit("AAPL", Side::Buy, 100, 10, 1))
            .await
            .unwrap();

        assert!(store.get_order(id).await.unwrap().is_none());

        store.rollback(tx).await.unwrap();
        assert!(store.get_order(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_active_book_surface_ordering() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        for (price, ts) in [(99u64, 3i64), (101, 1), (100, 2)] {
            store
                .insert_order(&mut tx, &limit("AAPL", Side::Buy, price, 1, ts))
                .await
                .unwrap();
        }
        store.commit(tx).await.unwrap();

        let rows = store.active_book(&Symbol::new("AAPL"), false).await.unwrap();
        let prices: Vec<Option<Price>> = rows.iter().map(|o| o.price()).collect();
        assert_eq!(
            prices,
            vec![
                Some(Price::from_u64(101)),
                Some(Price::from_u64(100)),
                Some(Price::from_u64(99)),
            ]
        );
    }

    #[tokio::test]
    async fn test_active_book_excludes_terminal_rows() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let mut order = limit("AAPL", Side::Buy, 100, 10, 1);
        let id = store.insert_order(&mut tx, &order).await.unwrap();
        store.commit(tx).await.unwrap();

        order.id = id;
        order.add_fill(Quantity::new(10), 2);
        let mut tx = store.begin().await.unwrap();
        store.update_order(&mut tx, &order).await.unwrap();
        store.commit(tx).await.unwrap();

        assert!(store
            .active_book(&Symbol::new("AAPL"), true)
            .await
            .unwrap()
            .is_empty());
    }
}
