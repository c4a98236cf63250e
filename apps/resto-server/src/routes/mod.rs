//! # Routes
//!
//! HTTP routes, one file per page area. Every route lives under `/api`.
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Public                                                                 │
//! │    GET  /health                    POST /auth/login                     │
//! │                                                                         │
//! │  Bearer token required (require_auth)                                   │
//! │    auth.rs         /auth/logout, /auth/me                               │
//! │    categories.rs   /categories                                          │
//! │    ingredients.rs  /ingredients, /ingredients/low-stock, .../stock      │
//! │    menu.rs         /menu-items, .../toggle, .../availability,           │
//! │                    .../recipe, /recipes/{id}                            │
//! │    pos.rs          /pos/menu, /pos/cart, /pos/cart/items, /pos/checkout │
//! │    shifts.rs       /shifts/current, /shifts/open, .../summary, .../close│
//! │    reports.rs      /reports/sales, /reports/orders/{id}, /reports/shifts│
//! │    settings.rs     /settings, /staff, /payment-methods  (owner/admin    │
//! │                    for changes)                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod categories;
pub mod ingredients;
pub mod menu;
pub mod pos;
pub mod reports;
pub mod settings;
pub mod shifts;

use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Builds the `/api` router with authentication applied.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth::router())
        .merge(categories::router())
        .merge(ingredients::router())
        .merge(menu::router())
        .merge(pos::router())
        .merge(shifts::router())
        .merge(reports::router())
        .merge(settings::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    let api = Router::new()
        .route("/health", get(health))
        .merge(auth::public_router())
        .merge(protected);

    Router::new().nest("/api", api).with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = state.db.health_check().await;

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}
