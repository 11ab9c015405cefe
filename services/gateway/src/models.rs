use serde::Deserialize;
use types::order::OrderStatus;

/// Body of `PUT /orders/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
    pub remaining_quantity: i64,
}

/// Query string of `GET /orderbook`.
#[derive(Debug, Clone, Deserialize)]
pub struct BookQuery {
    pub symbol: String,
    #[serde(default)]
    pub full: bool,
}

/// Query string of `GET /trades`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradesQuery {
    pub symbol: Option<String>,
}
