//! # Ingredient Routes
//!
//! Inventory page: ingredient CRUD, stock intake and the low-stock list.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use resto_core::validation::{
    validate_name, validate_price, validate_sku, validate_stock_level,
};
use resto_core::{Ingredient, Quantity, ValidationError};
use resto_db::{repository::generate_id, DbError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/ingredients/low-stock", get(list_low_stock))
        .route(
            "/ingredients/{id}",
            put(update_ingredient).delete(delete_ingredient),
        )
        .route("/ingredients/{id}/stock", post(adjust_stock))
}

/// Create/update body. Quantities are milli-units of `uom`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequest {
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub uom: String,
    #[serde(default)]
    pub current_stock_milli: i64,
    #[serde(default)]
    pub minimum_stock_alert_milli: i64,
    #[serde(default)]
    pub cost_per_unit_minor: Option<i64>,
}

/// Validated fields of an [`IngredientRequest`].
struct IngredientFields {
    name: String,
    sku: Option<String>,
    uom: String,
    current_stock: Quantity,
    minimum_stock_alert: Quantity,
    cost_per_unit_minor: Option<i64>,
}

impl IngredientRequest {
    fn validate(self) -> Result<IngredientFields, ValidationError> {
        let name = validate_name("name", &self.name)?;
        let uom = validate_name("unit of measure", &self.uom)?;

        let sku = match self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(sku) => {
                validate_sku(sku)?;
                Some(sku.to_string())
            }
            None => None,
        };

        let current_stock = Quantity::from_milli(self.current_stock_milli);
        let minimum_stock_alert = Quantity::from_milli(self.minimum_stock_alert_milli);
        validate_stock_level("current stock", current_stock)?;
        validate_stock_level("minimum stock alert", minimum_stock_alert)?;

        if let Some(cost) = self.cost_per_unit_minor {
            validate_price(cost)?;
        }

        Ok(IngredientFields {
            name,
            sku,
            uom,
            current_stock,
            minimum_stock_alert,
            cost_per_unit_minor: self.cost_per_unit_minor,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustRequest {
    /// Positive for an intake, negative for a write-off.
    pub delta_milli: i64,
}

async fn list_ingredients(State(state): State<AppState>) -> ApiResult<Json<Vec<Ingredient>>> {
    Ok(Json(state.db.ingredients().list(state.restaurant_id()).await?))
}

async fn list_low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<Ingredient>>> {
    Ok(Json(
        state.db.ingredients().list_low_stock(state.restaurant_id()).await?,
    ))
}

async fn create_ingredient(
    State(state): State<AppState>,
    Json(body): Json<IngredientRequest>,
) -> ApiResult<(StatusCode, Json<Ingredient>)> {
    let fields = body.validate()?;
    let now = Utc::now();

    let ingredient = Ingredient {
        id: generate_id(),
        restaurant_id: state.restaurant_id().to_string(),
        name: fields.name,
        sku: fields.sku,
        uom: fields.uom,
        current_stock_milli: fields.current_stock.milli(),
        minimum_stock_alert_milli: fields.minimum_stock_alert.milli(),
        cost_per_unit_minor: fields.cost_per_unit_minor,
        created_at: now,
        updated_at: now,
    };

    state.db.ingredients().insert(&ingredient).await?;
    info!(id = %ingredient.id, name = %ingredient.name, "Ingredient created");

    Ok((StatusCode::CREATED, Json(ingredient)))
}

async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<IngredientRequest>,
) -> ApiResult<Json<Ingredient>> {
    let fields = body.validate()?;

    let mut ingredient = state
        .db
        .ingredients()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ingredient", &id))?;

    ingredient.name = fields.name;
    ingredient.sku = fields.sku;
    ingredient.uom = fields.uom;
    ingredient.current_stock_milli = fields.current_stock.milli();
    ingredient.minimum_stock_alert_milli = fields.minimum_stock_alert.milli();
    ingredient.cost_per_unit_minor = fields.cost_per_unit_minor;
    ingredient.updated_at = Utc::now();

    state.db.ingredients().update(&ingredient).await?;
    Ok(Json(ingredient))
}

async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    match state.db.ingredients().delete(&id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(DbError::ForeignKeyViolation { .. }) => Err(ApiError::conflict(
            "Ingredient is used by a recipe. Remove it from the recipe first.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Stock intake or write-off. The result may not go below zero.
async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StockAdjustRequest>,
) -> ApiResult<Json<Ingredient>> {
    let delta = Quantity::from_milli(body.delta_milli);
    if delta == Quantity::zero() {
        return Err(ApiError::validation("Stock change must not be zero"));
    }

    let ingredient = state
        .db
        .ingredients()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ingredient", &id))?;
    ingredient.stock_after(delta)?;

    let updated = state.db.ingredients().adjust_stock(&id, delta).await?;
    info!(
        id = %updated.id,
        name = %updated.name,
        delta = %delta,
        stock = %updated.current_stock(),
        "Stock adjusted"
    );

    Ok(Json(updated))
}
