//! Matching Engine Service
//!
//! Continuous-trading limit order matching under price-time priority.
//! Each submission runs as one repository transaction: the incoming order,
//! every counter-order it touches, and the trades it produces commit
//! together or not at all.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced per symbol
//! - Quantity conservation: original size = remaining + sum of fills
//! - Terminal statuses (`filled`, `canceled`) are never mutated again
//! - At most one mutating operation per symbol at any instant

pub mod book;
pub mod engine;
pub mod lifecycle;
pub mod matching;

pub use engine::{BookSnapshot, Exchange};
