//! # Settings Routes
//!
//! Restaurant settings, staff profiles and payment methods.
//!
//! Reads are open to every logged-in user since the POS needs the tax rate
//! and the active tenders. Changes require an owner or admin.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::SessionContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use resto_core::shift::classify_payment;
use resto_core::validation::{
    validate_name, validate_optional_text, validate_pin, validate_tax_rate_bps,
};
use resto_core::{PaymentKind, PaymentMethod, RestaurantSettings, Role, StaffProfile};
use resto_db::{hash_pin, repository::generate_id};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings).put(update_settings))
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/{id}", delete(delete_staff))
        .route(
            "/payment-methods",
            get(list_payment_methods).post(create_payment_method),
        )
        .route("/payment-methods/{id}/toggle", post(toggle_payment_method))
        .route("/payment-methods/{id}", delete(delete_payment_method))
}

// =============================================================================
// Restaurant Settings
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub name: String,
    #[serde(default)]
    pub receipt_header: Option<String>,
    #[serde(default)]
    pub receipt_address: Option<String>,
    #[serde(default)]
    pub receipt_phone: Option<String>,
    #[serde(default)]
    pub receipt_footer: Option<String>,
    pub tax_rate_bps: u32,
}

async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<RestaurantSettings>> {
    Ok(Json(state.db.settings().get(state.restaurant_id()).await?))
}

async fn update_settings(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<SettingsRequest>,
) -> ApiResult<Json<RestaurantSettings>> {
    ctx.require_manager()?;
    validate_tax_rate_bps(body.tax_rate_bps)?;

    let text = |field: &str, value: Option<String>| {
        validate_optional_text(field, value.as_deref()).map(Option::unwrap_or_default)
    };

    let settings = RestaurantSettings {
        id: state.restaurant_id().to_string(),
        name: validate_name("name", &body.name)?,
        receipt_header: text("receipt header", body.receipt_header)?,
        receipt_address: text("receipt address", body.receipt_address)?,
        receipt_phone: text("receipt phone", body.receipt_phone)?,
        receipt_footer: text("receipt footer", body.receipt_footer)?,
        tax_rate_bps: body.tax_rate_bps,
        updated_at: Utc::now(),
    };

    let saved = state.db.settings().update(&settings).await?;
    info!(user_id = %ctx.user_id, "Settings updated");
    Ok(Json(saved))
}

// =============================================================================
// Staff
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStaffRequest {
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    pub pin: String,
}

async fn list_staff(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> ApiResult<Json<Vec<StaffProfile>>> {
    ctx.require_manager()?;
    Ok(Json(state.db.staff().list(state.restaurant_id()).await?))
}

async fn create_staff(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<CreateStaffRequest>,
) -> ApiResult<(StatusCode, Json<StaffProfile>)> {
    ctx.require_manager()?;
    if body.role == Role::Owner && ctx.role != Role::Owner {
        return Err(ApiError::forbidden("Only an owner can create another owner"));
    }

    let full_name = validate_name("full name", &body.full_name)?;
    let pin = body.pin.trim();
    validate_pin(pin)?;

    // PINs identify the user at login, so they must be unique.
    let taken = state.config.bootstrap_pin.as_deref() == Some(pin)
        || state
            .db
            .staff()
            .find_by_pin(state.restaurant_id(), pin)
            .await?
            .is_some();
    if taken {
        warn!(created_by = %ctx.user_id, "Rejected staff PIN already in use");
        return Err(ApiError::conflict("PIN is already in use"));
    }

    let staff = StaffProfile {
        id: generate_id(),
        restaurant_id: state.restaurant_id().to_string(),
        full_name,
        role: body.role,
        pin_hash: hash_pin(pin)?,
        created_at: Utc::now(),
    };
    state.db.staff().insert(&staff).await?;

    info!(
        id = %staff.id,
        role = ?staff.role,
        created_by = %ctx.user_id,
        "Staff created"
    );
    Ok((StatusCode::CREATED, Json(staff)))
}

async fn delete_staff(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    ctx.require_manager()?;
    if id == ctx.user_id {
        return Err(ApiError::conflict("You cannot delete your own profile"));
    }

    let staff = state
        .db
        .staff()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Staff", &id))?;
    if staff.role == Role::Owner && ctx.role != Role::Owner {
        return Err(ApiError::forbidden("Only an owner can remove an owner"));
    }

    state.db.staff().delete(&id).await?;
    state.carts.discard(&id);

    info!(id = %id, deleted_by = %ctx.user_id, "Staff deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Payment Methods
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PaymentMethodQuery {
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodRequest {
    pub name: String,
    /// Falls back to the name heuristic when omitted.
    #[serde(default)]
    pub kind: Option<PaymentKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub id: String,
    pub is_active: bool,
}

async fn list_payment_methods(
    State(state): State<AppState>,
    Query(query): Query<PaymentMethodQuery>,
) -> ApiResult<Json<Vec<PaymentMethod>>> {
    let repo = state.db.payment_methods();
    let methods = if query.active.unwrap_or(false) {
        repo.list_active(state.restaurant_id()).await?
    } else {
        repo.list(state.restaurant_id()).await?
    };
    Ok(Json(methods))
}

async fn create_payment_method(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<PaymentMethodRequest>,
) -> ApiResult<(StatusCode, Json<PaymentMethod>)> {
    ctx.require_manager()?;

    let name = validate_name("name", &body.name)?;
    let kind = body.kind.unwrap_or_else(|| classify_payment(&name));

    let method = PaymentMethod {
        id: generate_id(),
        restaurant_id: state.restaurant_id().to_string(),
        name,
        kind,
        is_active: true,
        created_at: Utc::now(),
    };
    state.db.payment_methods().insert(&method).await?;

    info!(id = %method.id, name = %method.name, kind = ?method.kind, "Payment method created");
    Ok((StatusCode::CREATED, Json(method)))
}

async fn toggle_payment_method(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<ToggleResponse>> {
    ctx.require_manager()?;
    let is_active = state.db.payment_methods().toggle_active(&id).await?;
    Ok(Json(ToggleResponse { id, is_active }))
}

async fn delete_payment_method(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    ctx.require_manager()?;
    state.db.payment_methods().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
