//! Transactional repository interface
//!
//! All mutating calls participate in a transaction handle obtained from
//! `begin`; nothing staged in a transaction is visible to readers until
//! `commit` applies the whole set atomically. Dropping a transaction
//! without committing is equivalent to `rollback`.

use async_trait::async_trait;
use types::errors::EngineError;
use types::ids::{OrderId, Symbol, TradeId};
use types::order::Order;
use types::trade::Trade;

/// Rows returned by `active_book` when the caller does not ask for the
/// full book.
pub const BOOK_DEPTH: usize = 10;

/// Repository for orders and the append-only trade log.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Transaction handle; staged writes live here until commit.
    type Tx: Send;

    async fn begin(&self) -> Result<Self::Tx, EngineError>;

    /// Persist a new order, assigning the next monotonic id.
    ///
    /// Ids are consumed even if the transaction later rolls back:
    /// monotonicity is guaranteed, density is not.
    async fn insert_order(&self, tx: &mut Self::Tx, order: &Order) -> Result<OrderId, EngineError>;

    /// Overwrite `remaining_quantity`, `status` and `updated_at` for the
    /// order with the given id. Other fields are never rewritten.
    async fn update_order(&self, tx: &mut Self::Tx, order: &Order) -> Result<(), EngineError>;

    /// Append a trade. A duplicate under the trade's idempotency key
    /// succeeds without writing and returns the existing id, so replayed
    /// matching runs emit each trade at most once.
    async fn insert_trade(&self, tx: &mut Self::Tx, trade: &Trade) -> Result<TradeId, EngineError>;

    async fn commit(&self, tx: Self::Tx) -> Result<(), EngineError>;

    async fn rollback(&self, tx: Self::Tx) -> Result<(), EngineError>;

    /// Single-row read; no transaction required.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, EngineError>;

    /// Orders in active statuses for the symbol.
    ///
    /// With `full = false` at most [`BOOK_DEPTH`] rows are returned,
    /// ordered by price descending (unpriced rows last) then creation
    /// time. That ordering is an inspection convenience only; the
    /// matching core always asks for the full set and establishes its
    /// own priority order.
    async fn active_book(&self, symbol: &Symbol, full: bool) -> Result<Vec<Order>, EngineError>;

    /// All committed trades, optionally filtered by symbol.
    async fn trades(&self, symbol: Option<&Symbol>) -> Result<Vec<Trade>, EngineError>;
}
