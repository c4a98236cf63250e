//! End-to-end tests of the HTTP API against an in-memory database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use resto_db::{Database, DbConfig};
use resto_server::{build_router, AppState, ServerConfig};

const OWNER_PIN: &str = "999999";

// =============================================================================
// Helpers
// =============================================================================

async fn test_app() -> Router {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let config = ServerConfig::from_lookup(|key| match key {
        "RESTO_DB_PATH" => Some(":memory:".to_string()),
        "RESTO_BOOTSTRAP_PIN" => Some(OWNER_PIN.to_string()),
        "RESTO_JWT_SECRET" => Some("test-secret".to_string()),
        _ => None,
    })
    .unwrap();

    build_router(AppState::new(db, config))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, Some(token), None).await
}

async fn post(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

async fn login(app: &Router, pin: &str) -> String {
    let (status, body) = send(app, Method::POST, "/api/auth/login", None, Some(json!({ "pin": pin }))).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

fn id_of(body: &Value) -> String {
    body["id"].as_str().unwrap().to_string()
}

async fn create_ingredient(app: &Router, token: &str, name: &str, stock_milli: i64) -> String {
    let (status, body) = post(
        app,
        "/api/ingredients",
        token,
        json!({
            "name": name,
            "uom": "kg",
            "currentStockMilli": stock_milli,
            "minimumStockAlertMilli": 1000
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    id_of(&body)
}

async fn create_menu_item(app: &Router, token: &str, name: &str, price_minor: i64) -> String {
    let (status, body) = post(
        app,
        "/api/menu-items",
        token,
        json!({ "name": name, "priceMinor": price_minor }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    id_of(&body)
}

async fn add_recipe_line(app: &Router, token: &str, menu_item_id: &str, ingredient_id: &str, milli: i64) {
    let (status, body) = post(
        app,
        &format!("/api/menu-items/{}/recipe", menu_item_id),
        token,
        json!({ "ingredientId": ingredient_id, "quantityNeededMilli": milli }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

async fn create_payment_method(app: &Router, token: &str, name: &str) -> Value {
    let (status, body) = post(app, "/api/payment-methods", token, json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

// =============================================================================
// Health & Auth
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_login_rejects_malformed_pin() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(json!({ "pin": "12ab" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_rejects_unknown_pin() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(json!({ "pin": "4321" }))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_bootstrap_pin_logs_in_owner() {
    let app = test_app().await;
    let token = login(&app, OWNER_PIN).await;

    let (status, me) = get(&app, "/api/auth/me", &token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "owner");
    assert_eq!(me["fullName"], "Administrator");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = test_app().await;

    let (status, _) = send(&app, Method::GET, "/api/menu-items", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/menu-items", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = test_app().await;
    let token = login(&app, OWNER_PIN).await;

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, "/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Staff & Roles
// =============================================================================

#[tokio::test]
async fn test_staff_pin_login_and_role_gate() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, staff) = post(
        &app,
        "/api/staff",
        &owner,
        json!({ "fullName": "Sari", "role": "cashier", "pin": "1111" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", staff);
    assert!(staff.get("pinHash").is_none());

    let (status, _) = post(
        &app,
        "/api/staff",
        &owner,
        json!({ "fullName": "Budi", "role": "cashier", "pin": "1111" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let cashier = login(&app, "1111").await;
    let (_, me) = get(&app, "/api/auth/me", &cashier).await;
    assert_eq!(me["role"], "cashier");

    let (status, _) = get(&app, "/api/settings", &cashier).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/settings",
        Some(&cashier),
        Some(json!({ "name": "Hacked", "taxRateBps": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = get(&app, "/api/staff", &cashier).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_deleted_staff_token_stops_working() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, staff) = post(
        &app,
        "/api/staff",
        &owner,
        json!({ "fullName": "Sari", "role": "cashier", "pin": "2222" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", staff);
    let cashier = login(&app, "2222").await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/staff/{}", id_of(&staff)),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = post(&app, "/api/shifts/open", &cashier, json!({ "startingCashMinor": 0 })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = get(&app, "/api/pos/cart", &cashier).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The deleting owner is unaffected.
    let (status, _) = get(&app, "/api/staff", &owner).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_settings_reject_tax_over_100_percent() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings",
        Some(&owner),
        Some(json!({ "name": "Warung", "taxRateBps": 10001 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_payment_method_kind_falls_back_to_heuristic() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let cash = create_payment_method(&app, &owner, "Cash").await;
    let qris = create_payment_method(&app, &owner, "QRIS").await;
    assert_eq!(cash["kind"], "cash");
    assert_eq!(qris["kind"], "non_cash");

    let (status, card) = post(
        &app,
        "/api/payment-methods",
        &owner,
        json!({ "name": "Cashless Card", "kind": "non_cash" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["kind"], "non_cash");

    let (status, _) = post(&app, "/api/payment-methods", &owner, json!({ "name": "Cash" })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, toggled) = post(
        &app,
        &format!("/api/payment-methods/{}/toggle", id_of(&qris)),
        &owner,
        json!({}),
    )
    .await;
    assert_eq!(toggled["isActive"], false);

    let (_, active) = get(&app, "/api/payment-methods?active=true", &owner).await;
    assert_eq!(active.as_array().unwrap().len(), 2);
}

// =============================================================================
// Inventory & Availability
// =============================================================================

#[tokio::test]
async fn test_stock_adjustment_cannot_go_negative() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;
    let rice = create_ingredient(&app, &owner, "Rice", 2000).await;

    let (status, body) = post(
        &app,
        &format!("/api/ingredients/{}/stock", rice),
        &owner,
        json!({ "deltaMilli": -3000 }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let (status, body) = post(
        &app,
        &format!("/api/ingredients/{}/stock", rice),
        &owner,
        json!({ "deltaMilli": 500 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentStockMilli"], 2500);
}

#[tokio::test]
async fn test_ingredient_in_recipe_cannot_be_deleted() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;
    let rice = create_ingredient(&app, &owner, "Rice", 5000).await;
    let item = create_menu_item(&app, &owner, "Fried Rice", 25_000).await;
    add_recipe_line(&app, &owner, &item, &rice, 200).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/ingredients/{}", rice),
        Some(&owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_short_ingredient_blocks_item() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;
    let egg = create_ingredient(&app, &owner, "Egg", 5000).await;
    let rice = create_ingredient(&app, &owner, "Rice", 0).await;
    let item = create_menu_item(&app, &owner, "Fried Rice", 25_000).await;
    add_recipe_line(&app, &owner, &item, &egg, 2000).await;
    add_recipe_line(&app, &owner, &item, &rice, 1000).await;

    let (status, availability) =
        get(&app, &format!("/api/menu-items/{}/availability", item), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(availability["available"], false);
    assert!(availability["reason"].as_str().unwrap().contains("Rice"));
    assert_eq!(availability["shortfall"]["currentStock"], 0);

    let (status, body) = post(
        &app,
        "/api/pos/cart/items",
        &owner,
        json!({ "menuItemId": item }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "ITEM_UNAVAILABLE");
}

#[tokio::test]
async fn test_inactive_item_cannot_be_added_to_cart() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;
    let item = create_menu_item(&app, &owner, "Iced Tea", 8_000).await;

    let (_, toggled) = post(&app, &format!("/api/menu-items/{}/toggle", item), &owner, json!({})).await;
    assert_eq!(toggled["isActive"], false);

    let (_, menu) = get(&app, "/api/pos/menu", &owner).await;
    assert!(menu.as_array().unwrap().is_empty());

    let (status, _) = post(&app, "/api/pos/cart/items", &owner, json!({ "menuItemId": item })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Shifts & Checkout
// =============================================================================

#[tokio::test]
async fn test_second_open_shift_rejected() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, _) = post(&app, "/api/shifts/open", &owner, json!({ "startingCashMinor": 100_000 })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(&app, "/api/shifts/open", &owner, json!({ "startingCashMinor": 0 })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_negative_starting_cash_rejected() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, _) = post(&app, "/api/shifts/open", &owner, json!({ "startingCashMinor": -1 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_amounts_rejected() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, body) = post(
        &app,
        "/api/shifts/open",
        &owner,
        json!({ "startingCashMinor": i64::MAX }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let (_, current) = get(&app, "/api/shifts/current", &owner).await;
    assert!(current.is_null());

    let (status, _) = post(
        &app,
        "/api/menu-items",
        &owner,
        json!({ "name": "Gold Leaf Steak", "priceMinor": i64::MAX }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Largest accepted price fills the cart's headroom in one line.
    let steak = create_menu_item(&app, &owner, "Gold Leaf Steak", resto_core::MAX_MONEY_MINOR).await;
    let (status, _) = post(&app, "/api/pos/cart/items", &owner, json!({ "menuItemId": steak })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(&app, "/api/pos/cart/items", &owner, json!({ "menuItemId": steak })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, cart) = get(&app, "/api/pos/cart", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totals"]["totalQuantity"], 1);
}

#[tokio::test]
async fn test_checkout_requires_open_shift() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;
    let cash = create_payment_method(&app, &owner, "Cash").await;
    let item = create_menu_item(&app, &owner, "Iced Tea", 8_000).await;

    let (status, _) = post(&app, "/api/pos/cart/items", &owner, json!({ "menuItemId": item })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        &app,
        "/api/pos/checkout",
        &owner,
        json!({ "paymentMethodId": id_of(&cash) }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("No shift is open"));

    // The cart survives a failed checkout.
    let (_, cart) = get(&app, "/api/pos/cart", &owner).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_rejected() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;
    let cash = create_payment_method(&app, &owner, "Cash").await;

    let (status, body) = post(
        &app,
        "/api/pos/checkout",
        &owner,
        json!({ "paymentMethodId": id_of(&cash) }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "CART_ERROR");
}

#[tokio::test]
async fn test_cart_adjust_removes_line_at_zero() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;
    let item = create_menu_item(&app, &owner, "Iced Tea", 8_000).await;

    post(&app, "/api/pos/cart/items", &owner, json!({ "menuItemId": item, "quantity": 2 })).await;

    let (status, cart) = send(
        &app,
        Method::PATCH,
        &format!("/api/pos/cart/items/{}", item),
        Some(&owner),
        Some(json!({ "delta": -5 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(cart["items"].as_array().unwrap().is_empty());
    assert_eq!(cart["totals"]["total"], 0);
}

#[tokio::test]
async fn test_full_shift_round_trip() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/settings",
        Some(&owner),
        Some(json!({ "name": "Warung Sari", "receiptFooter": "Thank you", "taxRateBps": 1000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let cash = create_payment_method(&app, &owner, "Cash").await;
    let qris = create_payment_method(&app, &owner, "QRIS").await;

    let rice = create_ingredient(&app, &owner, "Rice", 5000).await;
    let fried_rice = create_menu_item(&app, &owner, "Fried Rice", 25_000).await;
    add_recipe_line(&app, &owner, &fried_rice, &rice, 200).await;

    let (status, shift) = post(&app, "/api/shifts/open", &owner, json!({ "startingCashMinor": 100_000 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(shift["status"], "open");

    // Cash sale: 2 x 25,000 + 10% tax.
    let (status, cart) = post(
        &app,
        "/api/pos/cart/items",
        &owner,
        json!({ "menuItemId": fried_rice, "quantity": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totals"]["subtotal"], 50_000);
    assert_eq!(cart["totals"]["tax"], 5_000);
    assert_eq!(cart["totals"]["total"], 55_000);

    let (status, receipt) = post(
        &app,
        "/api/pos/checkout",
        &owner,
        json!({ "paymentMethodId": id_of(&cash) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", receipt);
    assert_eq!(receipt["total"], 55_000);
    assert_eq!(receipt["restaurantName"], "Warung Sari");
    assert_eq!(receipt["footer"], "Thank you");
    assert_eq!(receipt["cashierName"], "Administrator");
    assert_eq!(receipt["paymentMethod"], "Cash");
    assert_eq!(receipt["items"][0]["quantity"], 2);
    let cash_order_id = receipt["orderId"].as_str().unwrap().to_string();

    let (_, cart) = get(&app, "/api/pos/cart", &owner).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    // Non-cash sale: 1 x 25,000 + 10% tax.
    post(&app, "/api/pos/cart/items", &owner, json!({ "menuItemId": fried_rice })).await;
    let (status, receipt) = post(
        &app,
        "/api/pos/checkout",
        &owner,
        json!({ "paymentMethodId": id_of(&qris) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(receipt["total"], 27_500);

    // Stock is not drawn down by sales.
    let (_, ingredients) = get(&app, "/api/ingredients", &owner).await;
    assert_eq!(ingredients[0]["currentStockMilli"], 5000);

    let (status, summary) = get(&app, "/api/shifts/current/summary", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["startingCash"], 100_000);
    assert_eq!(summary["cashTotal"], 55_000);
    assert_eq!(summary["nonCashTotal"], 27_500);
    assert_eq!(summary["expectedCash"], 155_000);

    let (status, closure) = post(
        &app,
        "/api/shifts/current/close",
        &owner,
        json!({ "countedCashMinor": 150_000, "note": "short 5k" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", closure);
    assert_eq!(closure["variance"], -5_000);
    assert_eq!(closure["session"]["status"], "closed");
    assert_eq!(closure["session"]["varianceMinor"], -5_000);
    assert_eq!(closure["session"]["note"], "short 5k");

    let (status, current) = get(&app, "/api/shifts/current", &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert!(current.is_null());

    let (status, _) = post(
        &app,
        "/api/shifts/current/close",
        &owner,
        json!({ "countedCashMinor": 150_000 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, report) = get(&app, "/api/reports/sales?preset=today", &owner).await;
    assert_eq!(status, StatusCode::OK, "{}", report);
    assert_eq!(report["totals"]["revenue"], 82_500);
    assert_eq!(report["totals"]["transactionCount"], 2);
    assert_eq!(report["totals"]["averageBasket"], 41_250);
    assert_eq!(report["orders"]["totalItems"], 2);

    let (_, filtered) = get(&app, "/api/reports/sales?q=qris", &owner).await;
    assert_eq!(filtered["totals"]["transactionCount"], 1);

    let (status, detail) = get(&app, &format!("/api/reports/orders/{}", cash_order_id), &owner).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["order"]["totalMinor"], 55_000);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);

    let (_, shifts) = get(&app, "/api/reports/shifts?preset=week", &owner).await;
    assert_eq!(shifts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_report_rejects_half_custom_range() {
    let app = test_app().await;
    let owner = login(&app, OWNER_PIN).await;

    let (status, _) = get(&app, "/api/reports/sales?start=2024-01-01", &owner).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
