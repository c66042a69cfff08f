//! Shift endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use shiftbook_core::{
    CloseShift, Money, OpenShift, ReconciliationReport, Shift, SuggestedEndCash,
};

use crate::auth::Operator;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartShiftRequest {
    pub start_cash_amount: Money,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndShiftRequest {
    pub end_cash_amount: Money,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndShiftResponse {
    pub shift: Shift,
    pub reconciliation: ReconciliationReport,
}

pub async fn start_shift(
    State(state): State<Arc<AppState>>,
    Operator(operator_id): Operator,
    ApiJson(body): ApiJson<StartShiftRequest>,
) -> ApiResult<(StatusCode, Json<Shift>)> {
    let shift = state
        .register
        .open_shift(OpenShift {
            start_cash_amount: body.start_cash_amount,
            operator_id,
            notes: body.notes,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(shift)))
}

pub async fn end_shift(
    State(state): State<Arc<AppState>>,
    Operator(operator_id): Operator,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<EndShiftRequest>,
) -> ApiResult<Json<EndShiftResponse>> {
    let (shift, reconciliation) = state
        .register
        .close_shift(CloseShift {
            end_cash_amount: body.end_cash_amount,
            operator_id,
            notes: body.notes,
            expected_shift_id: Some(id),
        })
        .await?;

    Ok(Json(EndShiftResponse {
        shift,
        reconciliation,
    }))
}

pub async fn current_shift(State(state): State<Arc<AppState>>, _: Operator) -> Response {
    match state.register.current_shift() {
        Some(shift) => Json(shift).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn suggested_end_cash(
    State(state): State<Arc<AppState>>,
    _: Operator,
) -> ApiResult<Response> {
    let Some(shift) = state.register.current_shift() else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    Ok(Json(SuggestedEndCash::for_shift(&shift)?).into_response())
}

pub async fn list_shifts(
    State(state): State<Arc<AppState>>,
    _: Operator,
) -> ApiResult<Json<Vec<Shift>>> {
    let shifts = state.db.shifts().list(&state.config.register.id).await?;
    Ok(Json(shifts))
}

pub async fn get_shift(
    State(state): State<Arc<AppState>>,
    _: Operator,
    Path(id): Path<String>,
) -> ApiResult<Json<Shift>> {
    Ok(Json(find_shift(&state, &id).await?))
}

/// Drawer report for a closed shift; 409 while it is still open.
pub async fn reconciliation(
    State(state): State<Arc<AppState>>,
    _: Operator,
    Path(id): Path<String>,
) -> ApiResult<Json<ReconciliationReport>> {
    let shift = find_shift(&state, &id).await?;
    Ok(Json(ReconciliationReport::for_shift(&shift)?))
}

async fn find_shift(state: &AppState, id: &str) -> ApiResult<Shift> {
    state
        .db
        .shifts()
        .get_for_register(&state.config.register.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Shift", id))
}
