use crate::error::AppError;
use crate::models::{BookQuery, TradesQuery};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use matching_engine::BookSnapshot;
use types::errors::EngineError;
use types::ids::Symbol;
use types::trade::Trade;

pub async fn get_order_book(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> Result<Json<BookSnapshot>, AppError> {
    let symbol = Symbol::try_new(query.symbol)
        .ok_or_else(|| EngineError::InvalidInput("symbol is required".into()))?;

    let book = state.exchange.get_book(&symbol, query.full).await?;
    Ok(Json(book))
}

pub async fn get_trades(
    State(state): State<AppState>,
    Query(query): Query<TradesQuery>,
) -> Result<Json<Vec<Trade>>, AppError> {
    // An empty symbol parameter means no filter, like a missing one.
    let symbol = query.symbol.and_then(Symbol::try_new);

    let trades = state.exchange.get_trades(symbol.as_ref()).await?;
    Ok(Json(trades))
}
