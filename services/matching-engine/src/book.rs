//! Per-submission book state
//!
//! The book of record is the repository; on every submission the active
//! set is reloaded, split by side and sorted into two priority ladders.
//! A ladder is walked front-to-back with a cursor during matching and
//! never reordered afterwards, so priority is fixed at sort time.

use std::cmp::Ordering;
use types::numeric::Quantity;
use types::order::{Order, Side};

/// One side of the book, best priority first.
#[derive(Debug)]
pub struct Ladder {
    entries: Vec<Order>,
    cursor: usize,
}

impl Ladder {
    /// Build the buy-side ladder: highest price first, market orders
    /// (no price ceiling) ahead of any limit, earlier arrivals first
    /// within a price.
    pub fn bids(mut orders: Vec<Order>) -> Self {
        orders.sort_by(bid_priority);
        Self { entries: orders, cursor: 0 }
    }

    /// Build the sell-side ladder: lowest price first, market orders
    /// (no price floor) ahead of any limit, earlier arrivals first
    /// within a price.
    pub fn asks(mut orders: Vec<Order>) -> Self {
        orders.sort_by(ask_priority);
        Self { entries: orders, cursor: 0 }
    }

    /// Current best order on this side, if any remain.
    pub fn head(&self) -> Option<&Order> {
        self.entries.get(self.cursor)
    }

    /// Step past the current head.
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Apply a fill to the head order and return its updated state.
    pub fn fill_head(&mut self, quantity: Quantity, timestamp: i64) -> Option<Order> {
        let order = self.entries.get_mut(self.cursor)?;
        order.add_fill(quantity, timestamp);
        Some(order.clone())
    }

    pub fn into_entries(self) -> Vec<Order> {
        self.entries
    }
}

/// Split a working set into buy and sell rows, preserving input order.
pub fn split_sides(orders: Vec<Order>) -> (Vec<Order>, Vec<Order>) {
    orders.into_iter().partition(|o| o.side == Side::Buy)
}

fn bid_priority(a: &Order, b: &Order) -> Ordering {
    let by_price = match (a.price(), b.price()) {
        (Some(pa), Some(pb)) => pb.cmp(&pa),
        // a market buy outranks every priced bid
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_price.then_with(|| arrival(a).cmp(&arrival(b)))
}

fn ask_priority(a: &Order, b: &Order) -> Ordering {
    let by_price = match (a.price(), b.price()) {
        (Some(pa), Some(pb)) => pa.cmp(&pb),
        // a market sell outranks every priced ask
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_price.then_with(|| arrival(a).cmp(&arrival(b)))
}

/// Time priority key. Repository ids are monotonic, so the id breaks
/// exact timestamp ties in arrival order.
fn arrival(order: &Order) -> (i64, i64) {
    (order.created_at, order.id.as_i64())
}
