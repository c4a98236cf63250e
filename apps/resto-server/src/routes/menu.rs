//! # Menu Routes
//!
//! Menu management page: items, their recipes, and the derived availability.
//!
//! Availability is never stored. Every read runs the evaluator over the
//! recipe lines joined with current ingredient stock:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MenuRepository::list ──► MenuItem { recipe: [RecipeLine + stock] }     │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                   availability::evaluate(&item)                         │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │  MenuItemView { ...item, availability: { available, reason, ... } }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use resto_core::validation::{
    validate_name, validate_optional_text, validate_price, validate_recipe_quantity,
};
use resto_core::{evaluate, Availability, MenuItem, Quantity, RecipeLine, ValidationError};
use resto_db::repository::generate_id;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/menu-items", get(list_menu_items).post(create_menu_item))
        .route(
            "/menu-items/{id}",
            axum::routing::put(update_menu_item).delete(delete_menu_item),
        )
        .route("/menu-items/{id}/toggle", post(toggle_menu_item))
        .route("/menu-items/{id}/availability", get(menu_item_availability))
        .route("/menu-items/{id}/recipe", get(list_recipe).post(add_recipe_line))
        .route("/recipes/{id}", delete(remove_recipe_line))
}

// =============================================================================
// DTOs
// =============================================================================

/// A menu item with its evaluated availability.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    #[serde(flatten)]
    pub item: MenuItem,
    pub availability: Availability,
}

impl MenuItemView {
    pub fn evaluate(item: MenuItem) -> ApiResult<Self> {
        let availability = evaluate(&item)?;
        Ok(MenuItemView { item, availability })
    }

    pub fn evaluate_all(items: Vec<MenuItem>) -> ApiResult<Vec<Self>> {
        items.into_iter().map(MenuItemView::evaluate).collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemRequest {
    pub name: String,
    #[serde(default)]
    pub category_id: Option<String>,
    pub price_minor: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cooking_instructions: Option<String>,
    #[serde(default)]
    pub recipe_notes: Option<String>,
}

fn default_active() -> bool {
    true
}

impl MenuItemRequest {
    /// Validates and writes the request onto `item`.
    fn apply_to(self, item: &mut MenuItem) -> Result<(), ValidationError> {
        validate_price(self.price_minor)?;

        item.name = validate_name("name", &self.name)?;
        item.category_id = self
            .category_id
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        item.price_minor = self.price_minor;
        item.is_active = self.is_active;
        item.image_url = validate_optional_text("image url", self.image_url.as_deref())?;
        item.cooking_instructions =
            validate_optional_text("cooking instructions", self.cooking_instructions.as_deref())?;
        item.recipe_notes = validate_optional_text("recipe notes", self.recipe_notes.as_deref())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLineRequest {
    pub ingredient_id: String,
    pub quantity_needed_milli: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub id: String,
    pub is_active: bool,
}

// =============================================================================
// Handlers
// =============================================================================

async fn load_item(state: &AppState, id: &str) -> ApiResult<MenuItem> {
    state
        .db
        .menu()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item", id))
}

async fn list_menu_items(State(state): State<AppState>) -> ApiResult<Json<Vec<MenuItemView>>> {
    let items = state.db.menu().list(state.restaurant_id()).await?;
    Ok(Json(MenuItemView::evaluate_all(items)?))
}

async fn create_menu_item(
    State(state): State<AppState>,
    Json(body): Json<MenuItemRequest>,
) -> ApiResult<(StatusCode, Json<MenuItemView>)> {
    let now = Utc::now();
    let mut item = MenuItem {
        id: generate_id(),
        restaurant_id: state.restaurant_id().to_string(),
        category_id: None,
        category_name: None,
        name: String::new(),
        price_minor: 0,
        is_active: true,
        image_url: None,
        cooking_instructions: None,
        recipe_notes: None,
        created_at: now,
        updated_at: now,
        recipe: Vec::new(),
    };
    body.apply_to(&mut item)?;

    state.db.menu().insert(&item).await?;
    info!(id = %item.id, name = %item.name, price = item.price_minor, "Menu item created");

    let stored = load_item(&state, &item.id).await?;
    Ok((StatusCode::CREATED, Json(MenuItemView::evaluate(stored)?)))
}

async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MenuItemRequest>,
) -> ApiResult<Json<MenuItemView>> {
    let mut item = load_item(&state, &id).await?;
    body.apply_to(&mut item)?;
    item.updated_at = Utc::now();

    state.db.menu().update(&item).await?;

    let stored = load_item(&state, &id).await?;
    Ok(Json(MenuItemView::evaluate(stored)?))
}

async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.menu().delete(&id).await?;
    info!(id = %id, "Menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ToggleResponse>> {
    let is_active = state.db.menu().toggle_active(&id).await?;
    Ok(Json(ToggleResponse { id, is_active }))
}

async fn menu_item_availability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Availability>> {
    let item = load_item(&state, &id).await?;
    Ok(Json(evaluate(&item)?))
}

async fn list_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<RecipeLine>>> {
    let item = load_item(&state, &id).await?;
    Ok(Json(item.recipe))
}

async fn add_recipe_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RecipeLineRequest>,
) -> ApiResult<(StatusCode, Json<RecipeLine>)> {
    let quantity = Quantity::from_milli(body.quantity_needed_milli);
    validate_recipe_quantity(quantity)?;

    load_item(&state, &id).await?;
    state
        .db
        .ingredients()
        .get_by_id(&body.ingredient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ingredient", &body.ingredient_id))?;

    let line = state
        .db
        .menu()
        .add_recipe_line(&id, &body.ingredient_id, quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(line)))
}

async fn remove_recipe_line(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.menu().remove_recipe_line(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
