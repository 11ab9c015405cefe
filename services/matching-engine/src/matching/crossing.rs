//! Crossing detection and fill pricing
//!
//! A bid and ask cross when the bid is willing to pay at least the ask's
//! price; a market order on either side accepts any counter-price. The
//! execution price belongs to the resting order, the one that was on the
//! book first.

use types::numeric::Price;
use types::order::Order;

/// Check whether the pair at the top of both ladders can trade.
pub fn crosses(bid: &Order, ask: &Order) -> bool {
    match (bid.price(), ask.price()) {
        (Some(bid_price), Some(ask_price)) => bid_price >= ask_price,
        // market orders take whatever the other side offers
        _ => true,
    }
}

/// Execution price for a crossed pair.
///
/// The resting order's price wins; when the resting order is a market
/// order the aggressor's limit price is used instead. Returns `None`
/// only when neither side carries a price (market against market), in
/// which case no trade can be priced and the pair must be skipped.
pub fn fill_price(bid: &Order, ask: &Order) -> Option<Price> {
    let (resting, aggressor) = if arrival(bid) <= arrival(ask) {
        (bid, ask)
    } else {
        (ask, bid)
    };
    resting.price().or_else(|| aggressor.price())
}

fn arrival(order: &Order) -> (i64, i64) {
    (order.created_at, order.id.as_i64())
}
