//! Order endpoints.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;
use shiftbook_core::{LineItem, Money, Order, OrderDraft, OrderType, PaymentMethod};

use crate::auth::Operator;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::register::{PlaceOrder, PlacedOrder};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub shift_id: String,
    pub order_type: OrderType,
    #[serde(default)]
    pub table_number: Option<String>,
    pub line_items: Vec<LineItem>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub cash_received: Option<Money>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    pub shift_id: Option<String>,
}

/// Takes payment for an order: 201 when created, 200 when `id` was seen before.
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    Operator(operator_id): Operator,
    ApiJson(body): ApiJson<PlaceOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let request = PlaceOrder {
        id: body.id,
        draft: OrderDraft {
            shift_id: body.shift_id,
            order_type: body.order_type,
            table_number: body.table_number,
            line_items: body.line_items,
            payment_method: body.payment_method,
        },
        cash_received: body.cash_received,
    };

    debug!(operator_id = %operator_id, shift_id = %request.draft.shift_id, "Placing order");

    let (status, order) = match state.register.place_order(request).await? {
        PlacedOrder::Created(order) => (StatusCode::CREATED, order),
        PlacedOrder::Replayed(order) => (StatusCode::OK, order),
    };
    Ok((status, Json(order)))
}

pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    _: Operator,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = state
        .db
        .orders()
        .list(&state.config.register.id, query.shift_id.as_deref())
        .await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(state): State<Arc<AppState>>,
    _: Operator,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    state
        .db
        .orders()
        .get_by_id(&state.config.register.id, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Order", &id))
}
