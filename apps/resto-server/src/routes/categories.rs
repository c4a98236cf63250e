//! # Category Routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;
use resto_core::{validation::validate_name, Category};
use resto_db::repository::generate_id;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list(state.restaurant_id()).await?))
}

async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = Category {
        id: generate_id(),
        restaurant_id: state.restaurant_id().to_string(),
        name: validate_name("name", &body.name)?,
        created_at: Utc::now(),
    };

    state.db.categories().insert(&category).await?;
    info!(id = %category.id, name = %category.name, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// Menu items of a deleted category become uncategorized.
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
