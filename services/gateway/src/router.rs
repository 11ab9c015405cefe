use crate::handlers::{market, order};
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/orders", post(order::create_order))
        .route(
            "/orders/:id",
            get(order::get_order).delete(order::cancel_order),
        )
        .route("/orders/:id/status", put(order::update_order_status))
        .route("/orderbook", get(market::get_order_book))
        .route("/trades", get(market::get_trades))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
