//! Error taxonomy for the matching engine
//!
//! One typed enumeration shared by the repository, the engine, and the
//! transport layer; the gateway maps each kind to an HTTP status.

use crate::ids::OrderId;
use thiserror::Error;

/// Engine-wide error kinds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Input failed validation; reported before any transaction starts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Referenced order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The operation is incompatible with the order's current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Repository I/O failure; the surrounding transaction was rolled back.
    #[error("storage error: {0}")]
    Storage(String),

    /// Operation deadline exceeded; the transaction was rolled back.
    #[error("operation timed out")]
    Timeout,

    /// Invariant violation; indicates a programmer error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidInput("quantity must be greater than 0".into());
        assert_eq!(err.to_string(), "invalid input: quantity must be greater than 0");

        let err = EngineError::NotFound(OrderId::new(9));
        assert_eq!(err.to_string(), "order not found: 9");
    }
}
