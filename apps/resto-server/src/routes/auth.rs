//! # Auth Routes
//!
//! PIN login, logout and the current session.
//!
//! ## Login
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/auth/login { "pin": "1234" }                                 │
//! │         │                                                               │
//! │         ├── not 4-6 digits ──────────────────────────► 400              │
//! │         ├── equals RESTO_BOOTSTRAP_PIN ──► built-in owner               │
//! │         ├── matches a staff argon2 hash ─► that staff member            │
//! │         └── no match ────────────────────────────────► 401              │
//! │                                                                         │
//! │  ◄── { token, expiresAt, user: SessionContext }                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthToken, SessionContext};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use resto_core::validation::validate_pin;

pub fn public_router() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub pin: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: SessionContext,
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let pin = body.pin.trim();
    validate_pin(pin)?;

    let ctx = if state.config.bootstrap_pin.as_deref() == Some(pin) {
        SessionContext::bootstrap_owner(state.restaurant_id())
    } else {
        match state.db.staff().find_by_pin(state.restaurant_id(), pin).await? {
            Some(staff) => SessionContext::from_staff(&staff),
            None => {
                warn!("Login rejected: unknown PIN");
                return Err(ApiError::unauthorized("Invalid PIN"));
            }
        }
    };

    let (token, claims) = state.jwt.issue(&ctx)?;
    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(|| ApiError::internal("Token expiry out of range"))?;

    info!(user_id = %ctx.user_id, role = ?ctx.role, "Staff logged in");

    Ok(Json(LoginResponse {
        token,
        expires_at,
        user: ctx,
    }))
}

async fn logout(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Extension(token): Extension<AuthToken>,
) -> StatusCode {
    state.revoked.revoke(&token.jti, token.exp).await;
    state.carts.discard(&ctx.user_id);

    info!(user_id = %ctx.user_id, "Staff logged out");
    StatusCode::NO_CONTENT
}

async fn me(Extension(ctx): Extension<SessionContext>) -> Json<SessionContext> {
    Json(ctx)
}
