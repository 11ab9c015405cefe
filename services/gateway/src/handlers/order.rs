use crate::error::AppError;
use crate::models::StatusUpdateRequest;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use types::errors::EngineError;
use types::ids::OrderId;
use types::order::{Order, OrderInput};

pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<OrderInput>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state.exchange.submit(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, AppError> {
    let id = OrderId::new(id);
    let order = state
        .exchange
        .get_order(id)
        .await?
        .ok_or(EngineError::NotFound(id))?;
    Ok(Json(order))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.exchange.cancel(OrderId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<StatusCode, AppError> {
    state
        .exchange
        .set_status(OrderId::new(id), payload.status, payload.remaining_quantity)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
