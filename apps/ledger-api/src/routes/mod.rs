//! # HTTP Routes
//!
//! ```text
//! POST /shifts/start                        open a shift (201)
//! POST /shifts/{id}/end                     close and reconcile
//! GET  /shifts/current                      active shift or 204
//! GET  /shifts/current/suggested-end-cash   expected drawer or 204
//! GET  /shifts                              history, newest first
//! GET  /shifts/{id}                         one shift
//! GET  /shifts/{id}/reconciliation          report for a closed shift
//! POST /orders                              take payment (201, 200 on replay)
//! GET  /orders?shiftId=                     orders, newest first
//! GET  /orders/{id}                         one order
//! GET  /health                              unauthenticated liveness
//! ```

pub mod orders;
pub mod shifts;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/shifts", get(shifts::list_shifts))
        .route("/shifts/start", post(shifts::start_shift))
        .route("/shifts/current", get(shifts::current_shift))
        .route(
            "/shifts/current/suggested-end-cash",
            get(shifts::suggested_end_cash),
        )
        .route("/shifts/{id}", get(shifts::get_shift))
        .route("/shifts/{id}/end", post(shifts::end_shift))
        .route("/shifts/{id}/reconciliation", get(shifts::reconciliation))
        .route("/orders", post(orders::place_order).get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
    }
}
