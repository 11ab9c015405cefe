//! Price-time priority matching loop
//!
//! Walks both ladders top-down with cursors, emitting a fill for every
//! crossed pair. The loop is pure: it mutates only its own working set
//! and reports the effects; the caller persists them inside the
//! surrounding transaction.

pub mod crossing;

use crate::book::Ladder;
use types::ids::{OrderId, Symbol};
use types::order::Order;
use types::trade::Trade;

/// One matched pair: the post-fill state of both orders and the trade
/// to append.
#[derive(Debug, Clone)]
pub struct Fill {
    pub bid: Order,
    pub ask: Order,
    pub trade: Trade,
}

/// Everything a matching pass produced.
#[derive(Debug)]
pub struct MatchOutcome {
    /// Fills in execution order.
    pub fills: Vec<Fill>,
    bids: Vec<Order>,
    asks: Vec<Order>,
}

impl MatchOutcome {
    /// Final working-set state of an order after the pass.
    pub fn find(&self, id: OrderId) -> Option<&Order> {
        self.bids
            .iter()
            .chain(self.asks.iter())
            .find(|o| o.id == id)
    }
}

/// Run the matching loop over both ladders.
///
/// Terminates when either side is exhausted or the best pair no longer
/// crosses; since ladders are priority-sorted, a non-crossing top pair
/// means no deeper pair can cross either.
pub fn run(mut bids: Ladder, mut asks: Ladder, symbol: &Symbol, now: i64) -> MatchOutcome {
    let mut fills = Vec::new();

    loop {
        let (Some(bid), Some(ask)) = (bids.head(), asks.head()) else {
            break;
        };

        if !crossing::crosses(bid, ask) {
            break;
        }

        // Skip heads that have nothing left to give.
        if bid.remaining_quantity.is_zero() {
            bids.advance();
            continue;
        }
        if ask.remaining_quantity.is_zero() {
            asks.advance();
            continue;
        }

        let Some(price) = crossing::fill_price(bid, ask) else {
            // Two market orders cannot discover a price. Step past the
            // ask so priced depth behind it can still trade; the market
            // ask stays on the book for future priced flow.
            asks.advance();
            continue;
        };

        let quantity = bid.remaining_quantity.min(ask.remaining_quantity);

        let (Some(bid_state), Some(ask_state)) =
            (bids.fill_head(quantity, now), asks.fill_head(quantity, now))
        else {
            break;
        };

        let trade = Trade::new(
            symbol.clone(),
            bid_state.id,
            ask_state.id,
            price,
            quantity,
            now,
        );

        if bid_state.remaining_quantity.is_zero() {
            bids.advance();
        }
        if ask_state.remaining_quantity.is_zero() {
            asks.advance();
        }

        fills.push(Fill {
            bid: bid_state,
            ask: ask_state,
            trade,
        });
    }

    MatchOutcome {
        fills,
        bids: bids.into_entries(),
        asks: asks.into_entries(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::{Price, Quantity};
    use types::order::{OrderKind, OrderStatus, Side};

    fn order(id: i64, side: Side, price: Option<u64>, quantity: u64, ts: i64) -> Order {
        let kind = match price {
            Some(p) => OrderKind::Limit {
                price: Price::from_u64(p),
            },
            None => OrderKind::Market,
        };
        let mut o = Order::new(Symbol::new("AAPL"), side, kind, Quantity::new(quantity), ts);
        o.id = OrderId::new(id);
        o
    }

    fn run_pass(bids: Vec<Order>, asks: Vec<Order>) -> MatchOutcome {
        run(Ladder::bids(bids), Ladder::asks(asks), &Symbol::new("AAPL"), 100)
    }

    #[test]
    fn test_exact_match_fills_both() {
        let outcome = run_pass(
            vec![order(1, Side::Buy, Some(100), 10, 1)],
            vec![order(2, Side::Sell, Some(100), 10, 2)],
        );

        assert_eq!(outcome.fills.len(), 1);
        let fill = &outcome.fills[0];
        assert_eq!(fill.trade.price, Price::from_u64(100));
        assert_eq!(fill.trade.quantity, Quantity::new(10));
        assert_eq!(fill.bid.status, OrderStatus::Filled);
        assert_eq!(fill.ask.status, OrderStatus::Filled);
    }

    #[test]
    fn test_partial_fill_leaves_residual() {
        let outcome = run_pass(
            vec![order(2, Side::Buy, Some(100), 4, 2)],
            vec![order(1, Side::Sell, Some(100), 10, 1)],
        );

        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].trade.quantity, Quantity::new(4));

        let ask = outcome.find(OrderId::new(1)).unwrap();
        assert_eq!(ask.status, OrderStatus::PartiallyFilled);
        assert_eq!(ask.remaining_quantity, Quantity::new(6));

        let bid = outcome.find(OrderId::new(2)).unwrap();
        assert_eq!(bid.status, OrderStatus::Filled);
    }

    #[test]
    fn test_no_cross_no_trades() {
        let outcome = run_pass(
            vec![order(1, Side::Buy, Some(99), 5, 1)],
            vec![order(2, Side::Sell, Some(101), 5, 2)],
        );

        assert!(outcome.fills.is_empty());
        assert_eq!(
            outcome.find(OrderId::new(1)).unwrap().status,
            OrderStatus::Open
        );
    }

    #[test]
    fn test_market_buy_sweeps_ask_levels() {
        let outcome = run_pass(
            vec![order(3, Side::Buy, None, 5, 3)],
            vec![
                order(1, Side::Sell, Some(100), 3, 1),
                order(2, Side::Sell, Some(101), 4, 2),
            ],
        );

        assert_eq!(outcome.fills.len(), 2);
        assert_eq!(outcome.fills[0].trade.price, Price::from_u64(100));
        assert_eq!(outcome.fills[0].trade.quantity, Quantity::new(3));
        assert_eq!(outcome.fills[1].trade.price, Price::from_u64(101));
        assert_eq!(outcome.fills[1].trade.quantity, Quantity::new(2));

        let market = outcome.find(OrderId::new(3)).unwrap();
        assert_eq!(market.status, OrderStatus::Filled);
        let second_ask = outcome.find(OrderId::new(2)).unwrap();
        assert_eq!(second_ask.remaining_quantity, Quantity::new(2));
        assert_eq!(second_ask.status, OrderStatus::PartiallyFilled);
    }

    #[test]
    fn test_time_priority_at_equal_price() {
        let outcome = run_pass(
            vec![
                order(1, Side::Buy, Some(100), 5, 1),
                order(2, Side::Buy, Some(100), 5, 2),
            ],
            vec![order(3, Side::Sell, Some(100), 5, 3)],
        );

        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].bid.id, OrderId::new(1));

        let late_bid = outcome.find(OrderId::new(2)).unwrap();
        assert_eq!(late_bid.status, OrderStatus::Open);
        assert_eq!(late_bid.remaining_quantity, Quantity::new(5));
    }

    #[test]
    fn test_market_pair_is_skipped_not_traded() {
        // Market bid vs market ask cannot price; the priced ask behind
        // the market ask trades instead.
        let outcome = run_pass(
            vec![order(3, Side::Buy, None, 5, 3)],
            vec![
                order(1, Side::Sell, None, 5, 1),
                order(2, Side::Sell, Some(100), 5, 2),
            ],
        );

        assert_eq!(outcome.fills.len(), 1);
        assert_eq!(outcome.fills[0].trade.price, Price::from_u64(100));
        assert_eq!(outcome.fills[0].ask.id, OrderId::new(2));

        let market_ask = outcome.find(OrderId::new(1)).unwrap();
        assert_eq!(market_ask.status, OrderStatus::Open);
        assert_eq!(market_ask.remaining_quantity, Quantity::new(5));
    }

    #[test]
    fn test_market_residual_keeps_status() {
        let outcome = run_pass(
            vec![order(2, Side::Buy, None, 10, 2)],
            vec![order(1, Side::Sell, Some(100), 4, 1)],
        );

        assert_eq!(outcome.fills.len(), 1);
        let market = outcome.find(OrderId::new(2)).unwrap();
        assert_eq!(market.status, OrderStatus::PartiallyFilled);
        assert_eq!(market.remaining_quantity, Quantity::new(6));
    }

    #[test]
    fn test_incoming_limit_matches_multiple_resting_bids() {
        let outcome = run_pass(
            vec![
                order(1, Side::Buy, Some(102), 3, 1),
                order(2, Side::Buy, Some(101), 3, 2),
                order(3, Side::Buy, Some(99), 3, 3),
            ],
            vec![order(4, Side::Sell, Some(100), 10, 4)],
        );

        // Crosses 102 and 101 at the resting bids' prices, stops at 99.
        assert_eq!(outcome.fills.len(), 2);
        assert_eq!(outcome.fills[0].trade.price, Price::from_u64(102));
        assert_eq!(outcome.fills[1].trade.price, Price::from_u64(101));

        let ask = outcome.find(OrderId::new(4)).unwrap();
        assert_eq!(ask.remaining_quantity, Quantity::new(4));
        assert_eq!(ask.status, OrderStatus::PartiallyFilled);
        assert_eq!(
            outcome.find(OrderId::new(3)).unwrap().status,
            OrderStatus::Open
        );
    }

    #[test]
    fn test_trades_reference_buy_and_sell_correctly() {
        let outcome = run_pass(
            vec![order(1, Side::Buy, Some(100), 10, 1)],
            vec![order(2, Side::Sell, Some(100), 10, 2)],
        );

        let trade = &outcome.fills[0].trade;
        assert_eq!(trade.buy_order_id, OrderId::new(1));
        assert_eq!(trade.sell_order_id, OrderId::new(2));
    }
}
