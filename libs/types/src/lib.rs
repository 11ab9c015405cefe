//! Shared domain types for the order matching venue.
//!
//! Everything the services agree on lives here: identifier newtypes,
//! fixed-point price and integral quantity wrappers, the order and trade
//! entities, and the engine-wide error taxonomy.

pub mod errors;
pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
