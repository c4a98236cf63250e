//! # POS Routes
//!
//! The cashier screen: searchable menu, per-user cart and checkout.
//!
//! ## Checkout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/pos/checkout { "paymentMethodId": "..." }                    │
//! │         │                                                               │
//! │         ├── cart empty ─────────────────────────────► 422 CART_ERROR    │
//! │         ├── no open shift ──────────────────────────► 409 CONFLICT      │
//! │         ├── payment method unknown or inactive ─────► 400               │
//! │         ├── any line no longer sellable ────────────► 422 UNAVAILABLE   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  cart::draft_order ──► OrderRepository::insert_with_items (one tx)      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  cart cleared ──► 201 Receipt                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Carts live in memory keyed by user id and do not survive a restart.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::SessionContext;
use crate::error::{ApiError, ApiResult};
use crate::routes::menu::MenuItemView;
use crate::state::AppState;
use resto_core::availability::ensure_sellable;
use resto_core::cart::{draft_order, Cart, CartItem, CartTotals};
use resto_core::validation::validate_search_query;
use resto_core::{CoreError, MenuItem, Money, OrderItem, PaymentMethod, TaxRate};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pos/menu", get(pos_menu))
        .route("/pos/cart", get(get_cart).delete(clear_cart))
        .route("/pos/cart/items", post(add_to_cart))
        .route(
            "/pos/cart/items/{menu_item_id}",
            patch(adjust_cart_item).delete(remove_cart_item),
        )
        .route("/pos/checkout", post(checkout))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosMenuQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub category_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
}

impl CartResponse {
    fn new(cart: &Cart, tax_rate: TaxRate) -> ApiResult<Self> {
        Ok(CartResponse {
            items: cart.items.clone(),
            totals: cart.totals(tax_rate)?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub menu_item_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AdjustCartRequest {
    /// Added to the line quantity; a line reaching zero is removed.
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method_id: String,
}

/// Everything the printed receipt shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub restaurant_name: String,
    pub header: String,
    pub address: String,
    pub phone: String,
    pub footer: String,
    pub order_id: String,
    pub cashier_name: String,
    pub payment_method: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub tax_rate_bps: u32,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Menu
// =============================================================================

async fn pos_menu(
    State(state): State<AppState>,
    Query(query): Query<PosMenuQuery>,
) -> ApiResult<Json<Vec<MenuItemView>>> {
    let q = validate_search_query(&query.q)?;
    let category_id = query
        .category_id
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let items = state
        .db
        .menu()
        .list_for_pos(state.restaurant_id(), &q, category_id)
        .await?;

    Ok(Json(MenuItemView::evaluate_all(items)?))
}

// =============================================================================
// Cart
// =============================================================================

async fn tax_rate(state: &AppState) -> ApiResult<TaxRate> {
    Ok(state.db.settings().get(state.restaurant_id()).await?.tax_rate())
}

async fn sellable_item(state: &AppState, menu_item_id: &str) -> ApiResult<MenuItem> {
    let item = state
        .db
        .menu()
        .get_by_id(menu_item_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Menu item", menu_item_id))?;
    ensure_sellable(&item)?;
    Ok(item)
}

async fn get_cart(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> ApiResult<Json<CartResponse>> {
    let rate = tax_rate(&state).await?;
    let response = state
        .carts
        .with_cart(&ctx.user_id, |cart| CartResponse::new(cart, rate))?;
    Ok(Json(response))
}

async fn clear_cart(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
) -> StatusCode {
    state.carts.discard(&ctx.user_id);
    StatusCode::NO_CONTENT
}

async fn add_to_cart(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<AddToCartRequest>,
) -> ApiResult<Json<CartResponse>> {
    let item = sellable_item(&state, &body.menu_item_id).await?;
    let rate = tax_rate(&state).await?;

    let response = state.carts.with_cart_mut(&ctx.user_id, |cart| {
        cart.add_item(&item, body.quantity)?;
        CartResponse::new(cart, rate)
    })?;

    Ok(Json(response))
}

async fn adjust_cart_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(menu_item_id): Path<String>,
    Json(body): Json<AdjustCartRequest>,
) -> ApiResult<Json<CartResponse>> {
    let rate = tax_rate(&state).await?;

    let response = state.carts.with_cart_mut(&ctx.user_id, |cart| {
        cart.adjust_quantity(&menu_item_id, body.delta)?;
        CartResponse::new(cart, rate)
    })?;

    Ok(Json(response))
}

async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(menu_item_id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    let rate = tax_rate(&state).await?;

    let response = state.carts.with_cart_mut(&ctx.user_id, |cart| {
        cart.remove_item(&menu_item_id)?;
        CartResponse::new(cart, rate)
    })?;

    Ok(Json(response))
}

// =============================================================================
// Checkout
// =============================================================================

async fn checkout(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(body): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<Receipt>)> {
    let cart = state.carts.with_cart(&ctx.user_id, Cart::clone);
    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let session = state
        .db
        .sessions()
        .current_open(state.restaurant_id())
        .await?
        .ok_or_else(ApiError::no_open_shift)?;

    let payment = active_payment_method(&state, &body.payment_method_id).await?;

    // Stock may have moved since the items were added.
    for line in &cart.items {
        sellable_item(&state, &line.menu_item_id).await?;
    }

    let settings = state.db.settings().get(state.restaurant_id()).await?;
    let (mut order, items) = draft_order(
        &cart,
        settings.tax_rate(),
        &session,
        &ctx.user_id,
        &payment,
        Utc::now(),
    )?;
    order.cashier_name = Some(ctx.full_name.clone());

    state.db.orders().insert_with_items(&order, &items).await?;
    state.carts.discard(&ctx.user_id);

    info!(
        order_id = %order.id,
        session_id = %session.id,
        cashier_id = %ctx.user_id,
        payment = %payment.name,
        total = order.total_minor,
        "Checkout completed"
    );

    let receipt = Receipt {
        restaurant_name: settings.name,
        header: settings.receipt_header,
        address: settings.receipt_address,
        phone: settings.receipt_phone,
        footer: settings.receipt_footer,
        order_id: order.id.clone(),
        cashier_name: ctx.full_name,
        payment_method: payment.name,
        subtotal: Money::from_minor(order.subtotal_minor),
        tax: Money::from_minor(order.tax_minor),
        total: order.total(),
        tax_rate_bps: settings.tax_rate_bps,
        created_at: order.created_at,
        items,
    };

    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn active_payment_method(state: &AppState, id: &str) -> ApiResult<PaymentMethod> {
    let method = state.db.payment_methods().get_by_id(id).await?;

    match method {
        Some(method) if method.is_active && method.restaurant_id == state.restaurant_id() => {
            Ok(method)
        }
        Some(method) => {
            warn!(payment_method = %method.name, "Checkout with inactive payment method");
            Err(ApiError::validation(format!(
                "Payment method '{}' is not active",
                method.name
            )))
        }
        None => Err(ApiError::validation("Unknown payment method")),
    }
}
