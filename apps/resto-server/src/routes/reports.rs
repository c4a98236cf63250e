//! # Report Routes
//!
//! Sales report, order detail and the shift audit list.
//!
//! Range selection accepts either a `preset` or an explicit `start`/`end`
//! pair of calendar days (UTC). With neither, the range is today.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use resto_core::report::{build_sales_report, DatePreset, DateRange, SalesReport};
use resto_core::validation::validate_search_query;
use resto_core::{Order, OrderItem, PosSession};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports/sales", get(sales_report))
        .route("/reports/orders/{id}", get(order_detail))
        .route("/reports/shifts", get(shift_audit))
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub preset: Option<DatePreset>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl RangeQuery {
    /// Explicit dates win over a preset.
    fn resolve(&self, today: NaiveDate) -> ApiResult<DateRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Ok(DateRange::new(start, end)?),
            (None, None) => Ok(DateRange::preset(
                self.preset.unwrap_or(DatePreset::Today),
                today,
            )),
            _ => Err(ApiError::validation(
                "Both start and end dates are required for a custom range",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    #[serde(default)]
    pub preset: Option<DatePreset>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub q: String,
    #[serde(default = "first_page")]
    pub page: usize,
}

fn first_page() -> usize {
    1
}

impl SalesQuery {
    fn range(&self) -> RangeQuery {
        RangeQuery {
            preset: self.preset,
            start: self.start,
            end: self.end,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> ApiResult<Json<SalesReport>> {
    let range = query.range().resolve(Utc::now().date_naive())?;
    let q = validate_search_query(&query.q)?;
    let (from, to) = range.bounds();

    let orders = state
        .db
        .orders()
        .list_in_range(state.restaurant_id(), from, to)
        .await?;

    Ok(Json(build_sales_report(range, orders, &q, query.page)))
}

async fn order_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetail>> {
    let (order, items) = state.db.orders().get_with_items(&id).await?;
    if order.restaurant_id != state.restaurant_id() {
        return Err(ApiError::not_found("Order", &id));
    }

    Ok(Json(OrderDetail { order, items }))
}

async fn shift_audit(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<PosSession>>> {
    let range = query.resolve(Utc::now().date_naive())?;
    let (from, to) = range.bounds();

    Ok(Json(
        state
            .db
            .sessions()
            .list_started_in_range(state.restaurant_id(), from, to)
            .await?,
    ))
}
