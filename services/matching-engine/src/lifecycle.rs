//! Order status state machine
//!
//! Every transition check in the engine goes through this table; nothing
//! else decides what an order is allowed to become.
//!
//! | from \ to         | partially_filled | filled | canceled |
//! |-------------------|------------------|--------|----------|
//! | open              | yes              | yes    | yes      |
//! | partially_filled  | no               | yes    | yes      |
//! | filled            | no               | no     | no       |
//! | canceled          | no               | no     | no       |

use types::errors::EngineError;
use types::numeric::Quantity;
use types::order::{Order, OrderStatus};

/// Whether the state machine permits `from -> to`.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Open, PartiallyFilled | Filled | Canceled) | (PartiallyFilled, Filled | Canceled)
    )
}

/// Validate an administrative status override and convert the requested
/// remaining quantity: quantity bounds first, then the transition table,
/// then the status-specific quantity rules.
pub fn validate_override(
    order: &Order,
    status: OrderStatus,
    remaining: i64,
) -> Result<Quantity, EngineError> {
    if remaining < 0 || remaining as u64 > order.quantity.as_u64() {
        return Err(EngineError::InvalidInput(format!(
            "invalid remaining_quantity: {}, must be between 0 and original quantity {}",
            remaining, order.quantity
        )));
    }
    let remaining = Quantity::new(remaining as u64);

    if !can_transition(order.status, status) {
        return Err(EngineError::InvalidInput(format!(
            "invalid state transition: {} cannot transition to {}",
            order.status, status
        )));
    }

    match status {
        OrderStatus::Filled if !remaining.is_zero() => Err(EngineError::InvalidInput(
            "filled status requires remaining_quantity to be 0".into(),
        )),
        OrderStatus::Open | OrderStatus::PartiallyFilled if remaining.is_zero() => {
            Err(EngineError::InvalidInput(format!(
                "{} status requires remaining_quantity greater than 0",
                status
            )))
        }
        _ => Ok(remaining),
    }
}
