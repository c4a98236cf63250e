//! # Shift Routes
//!
//! Opening, monitoring and closing the cash drawer shift.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /shifts/open          { startingCashMinor }     ──► PosSession    │
//! │  GET  /shifts/current                                 ──► PosSession?   │
//! │  GET  /shifts/current/summary                         ──► ShiftSummary  │
//! │  POST /shifts/current/close { countedCashMinor, note } ──► ShiftClosure │
//! │                                                                         │
//! │  expected = starting cash + cash sales                                  │
//! │  variance = counted - expected   (recorded, never blocks the close)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::SessionContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use resto_core::shift::{self, ShiftClosure, ShiftSummary};
use resto_core::{Money, PosSession};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shifts/current", get(current_shift))
        .route("/shifts/open", post(open_shift))
        .route("/shifts/current/summary", get(current_summary))
        .route("/shifts/current/close", post(close_shift))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenShiftRequest {
    pub starting_cash_minor: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseShiftRequest {
    pub counted_cash_minor: i64,
    #[serde(default)]
    pub note: Option<String>,
}

async fn open_session(state: &AppState) -> ApiResult<PosSession> {
    state
        .db
        .sessions()
        .current_open(state.restaurant_id())
        .await?
        .ok_or_else(ApiError::no_open_shift)
}

async fn current_shift(State(state): State<AppState>) -> ApiResult<Json<Option<PosSession>>> {
    Ok(Json(
        state.db.sessions().current_open(state.restaurant_id()).await?,
    ))
}

async fn open_shift(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<OpenShiftRequest>,
) -> ApiResult<(StatusCode, Json<PosSession>)> {
    let session = shift::open(
        state.restaurant_id(),
        &ctx.user_id,
        Money::from_minor(body.starting_cash_minor),
        Utc::now(),
    )?;

    state.db.sessions().insert_open(&session).await?;

    let mut stored = state
        .db
        .sessions()
        .get_by_id(&session.id)
        .await?
        .ok_or_else(|| ApiError::internal("Opened shift could not be reloaded"))?;
    if stored.cashier_name.is_none() {
        stored.cashier_name = Some(ctx.full_name);
    }

    Ok((StatusCode::CREATED, Json(stored)))
}

async fn current_summary(State(state): State<AppState>) -> ApiResult<Json<ShiftSummary>> {
    let session = open_session(&state).await?;
    let orders = state.db.orders().list_for_session(&session.id).await?;

    Ok(Json(shift::summarize(&session, &orders)?))
}

async fn close_shift(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<CloseShiftRequest>,
) -> ApiResult<Json<ShiftClosure>> {
    let session = open_session(&state).await?;
    let orders = state.db.orders().list_for_session(&session.id).await?;

    let closure = shift::close(
        &session,
        &orders,
        Money::from_minor(body.counted_cash_minor),
        body.note.as_deref(),
        Utc::now(),
    )?;

    state.db.sessions().close(&closure.session).await?;

    info!(
        session_id = %closure.session.id,
        closed_by = %ctx.user_id,
        expected = %closure.summary.expected_cash,
        counted = %closure.counted_cash,
        variance = %closure.variance,
        "Shift reconciled"
    );

    Ok(Json(closure))
}
