//! Engine facade
//!
//! Public operations invoked by the transport layer. Mutating operations
//! are serialized per symbol through a mutex registry; reads go straight
//! to the repository. Every repository call inside an operation runs
//! under that operation's deadline, and any failure rolls the whole
//! transaction back.

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use persistence::Store;
use types::errors::EngineError;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderInput, OrderKind, OrderStatus, OrderType, Side};
use types::trade::Trade;

use crate::book::{self, Ladder};
use crate::lifecycle;
use crate::matching;

/// Default deadline for one engine operation, covering every repository
/// round-trip it makes.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

/// The matching venue: one instance serves all symbols.
pub struct Exchange<S: Store> {
    store: Arc<S>,
    symbol_locks: DashMap<String, Arc<Mutex<()>>>,
    op_timeout: Duration,
}

/// Read-side view of one symbol's active book.
#[derive(Debug, Clone, Serialize)]
pub struct BookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
    pub full: bool,
}

impl<S: Store> Exchange<S> {
    pub fn new(store: S) -> Self {
        Self::with_timeout(store, DEFAULT_OP_TIMEOUT)
    }

    pub fn with_timeout(store: S, op_timeout: Duration) -> Self {
        Self {
            store: Arc::new(store),
            symbol_locks: DashMap::new(),
            op_timeout,
        }
    }

    /// Submit a new order and match it against the book.
    ///
    /// Returns the order in its post-matching state. The inserted order,
    /// all counter-order updates and all trades commit as one
    /// transaction; on any failure nothing is persisted.
    pub async fn submit(&self, input: OrderInput) -> Result<Order, EngineError> {
        let (symbol, side, kind, quantity) = validate(input)?;

        let lock = self.symbol_lock(&symbol);
        let _guard = lock.lock().await;
        let deadline = Instant::now() + self.op_timeout;

        let now = now_nanos();
        let mut order = Order::new(symbol, side, kind, quantity, now);

        let mut tx = self.guarded(deadline, self.store.begin()).await?;
        match self.match_submission(&mut tx, &mut order, deadline, now).await {
            Ok(committed) => {
                self.guarded(deadline, self.store.commit(tx)).await?;
                tracing::info!(
                    order_id = %committed.id,
                    symbol = %committed.symbol,
                    status = %committed.status,
                    "order processed"
                );
                Ok(committed)
            }
            Err(err) => {
                tracing::error!(order_id = %order.id, error = %err, "submit rolled back");
                let _ = self.store.rollback(tx).await;
                Err(err)
            }
        }
    }

    /// Cancel an active order. The remaining quantity is preserved so a
    /// partial fill stays visible after cancellation.
    pub async fn cancel(&self, id: OrderId) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.op_timeout;
        let symbol = self.guarded(deadline, self.load(id)).await?.symbol;

        let lock = self.symbol_lock(&symbol);
        let _guard = lock.lock().await;

        // Re-read under the lock: a fill may have landed since the
        // unlocked lookup above.
        let mut order = self.guarded(deadline, self.load(id)).await?;
        if !lifecycle::can_transition(order.status, OrderStatus::Canceled) {
            return Err(EngineError::Conflict(format!(
                "order {} cannot be canceled, status is {}",
                id, order.status
            )));
        }
        order.cancel(now_nanos());

        self.persist_update(&order, deadline).await?;
        tracing::info!(order_id = %id, "order canceled");
        Ok(())
    }

    /// Administrative status override with full transition validation.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        remaining_quantity: i64,
    ) -> Result<(), EngineError> {
        let deadline = Instant::now() + self.op_timeout;
        let symbol = self.guarded(deadline, self.load(id)).await?.symbol;

        let lock = self.symbol_lock(&symbol);
        let _guard = lock.lock().await;

        let mut order = self.guarded(deadline, self.load(id)).await?;
        let remaining = lifecycle::validate_override(&order, status, remaining_quantity)?;

        order.status = status;
        order.remaining_quantity = remaining;
        order.updated_at = now_nanos();

        self.persist_update(&order, deadline).await?;
        tracing::info!(order_id = %id, status = %status, "order status overridden");
        Ok(())
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Option<Order>, EngineError> {
        self.store.get_order(id).await
    }

    /// Active book for a symbol, split by side. Row order is the store's
    /// inspection order; `full = false` truncates to the top of book.
    pub async fn get_book(&self, symbol: &Symbol, full: bool) -> Result<BookSnapshot, EngineError> {
        let rows = self.store.active_book(symbol, full).await?;
        let (bids, asks) = book::split_sides(rows);
        Ok(BookSnapshot {
            symbol: symbol.clone(),
            bids,
            asks,
            full,
        })
    }

    pub async fn get_trades(&self, symbol: Option<&Symbol>) -> Result<Vec<Trade>, EngineError> {
        self.store.trades(symbol).await
    }

    /// The submission transaction script: persist the incoming order,
    /// rebuild the working set, match, and stage every effect on `tx`.
    async fn match_submission(
        &self,
        tx: &mut S::Tx,
        order: &mut Order,
        deadline: Instant,
        now: i64,
    ) -> Result<Order, EngineError> {
        order.id = self
            .guarded(deadline, self.store.insert_order(tx, order))
            .await?;

        let candidates = self
            .guarded(deadline, self.store.active_book(&order.symbol, true))
            .await?;

        // Some backends already surface the just-inserted row inside the
        // transaction; matching relies only on the merged collection.
        let mut working: Vec<Order> = candidates
            .into_iter()
            .filter(|o| o.id != order.id)
            .collect();
        working.push(order.clone());

        let (bid_rows, ask_rows) = book::split_sides(working);
        let outcome = matching::run(
            Ladder::bids(bid_rows),
            Ladder::asks(ask_rows),
            &order.symbol,
            now,
        );

        for fill in &outcome.fills {
            self.guarded(deadline, self.store.update_order(tx, &fill.bid))
                .await?;
            self.guarded(deadline, self.store.update_order(tx, &fill.ask))
                .await?;
            let trade_id = self
                .guarded(deadline, self.store.insert_trade(tx, &fill.trade))
                .await?;
            tracing::info!(
                trade_id = %trade_id,
                symbol = %fill.trade.symbol,
                price = %fill.trade.price,
                quantity = %fill.trade.quantity,
                "trade executed"
            );
        }

        Ok(outcome
            .find(order.id)
            .cloned()
            .unwrap_or_else(|| order.clone()))
    }

    /// Write one order mutation in its own transaction.
    async fn persist_update(&self, order: &Order, deadline: Instant) -> Result<(), EngineError> {
        let mut tx = self.guarded(deadline, self.store.begin()).await?;
        match self
            .guarded(deadline, self.store.update_order(&mut tx, order))
            .await
        {
            Ok(()) => self.guarded(deadline, self.store.commit(tx)).await,
            Err(err) => {
                let _ = self.store.rollback(tx).await;
                Err(err)
            }
        }
    }

    async fn load(&self, id: OrderId) -> Result<Order, EngineError> {
        self.store
            .get_order(id)
            .await?
            .ok_or(EngineError::NotFound(id))
    }

    fn symbol_lock(&self, symbol: &Symbol) -> Arc<Mutex<()>> {
        self.symbol_locks
            .entry(symbol.as_str().to_string())
            .or_default()
            .clone()
    }

    /// Run a repository future under the operation deadline.
    async fn guarded<T>(
        &self,
        deadline: Instant,
        fut: impl Future<Output = Result<T, EngineError>>,
    ) -> Result<T, EngineError> {
        match tokio::time::timeout_at(deadline, fut).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout),
        }
    }
}

fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Check a raw submission and lift it into domain types.
fn validate(input: OrderInput) -> Result<(Symbol, Side, OrderKind, Quantity), EngineError> {
    let symbol = Symbol::try_new(input.symbol)
        .ok_or_else(|| EngineError::InvalidInput("symbol is required".into()))?;

    if input.quantity <= 0 {
        return Err(EngineError::InvalidInput(
            "quantity must be greater than 0".into(),
        ));
    }
    let quantity = Quantity::new(input.quantity as u64);

    let kind = match input.order_type {
        OrderType::Limit => {
            let raw = input.price.ok_or_else(|| {
                EngineError::InvalidInput("price is required for limit orders".into())
            })?;
            let price = Price::try_new(raw).ok_or_else(|| {
                EngineError::InvalidInput("price must be greater than 0 for limit orders".into())
            })?;
            OrderKind::Limit { price }
        }
        OrderType::Market => OrderKind::Market,
    };

    Ok((symbol, input.side, kind, quantity))
}
