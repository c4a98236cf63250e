//! # Sales Reporting
//!
//! Pure aggregation over orders already loaded for a date range.
//!
//! ```text
//! orders in range ──► filter(query) ──► totals ──► paginate(page, 20)
//!                     id / method /     revenue
//!                     cashier name      count
//!                                       avg basket
//! ```
//!
//! Date ranges are calendar days in UTC, inclusive on both ends. The
//! repository layer queries the half-open instant range from
//! [`DateRange::bounds`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Order;
use crate::REPORT_PAGE_SIZE;

// =============================================================================
// Date Ranges
// =============================================================================

/// Quick-pick ranges on the reports page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DatePreset {
    /// Today only.
    Today,
    /// The last seven days including today.
    Week,
    /// From the first of the month through today.
    Month,
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::invalid_format(
                "date range",
                "start date must not be after end date",
            ));
        }
        Ok(DateRange { start, end })
    }

    pub fn preset(preset: DatePreset, today: NaiveDate) -> Self {
        let start = match preset {
            DatePreset::Today => today,
            DatePreset::Week => today - Duration::days(6),
            DatePreset::Month => today.with_day(1).unwrap_or(today),
        };
        DateRange { start, end: today }
    }

    /// `[start 00:00, day after end 00:00)` in UTC.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = self.start.and_time(chrono::NaiveTime::MIN).and_utc();
        let to = (self.end + Duration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        (from, to)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let (from, to) = self.bounds();
        at >= from && at < to
    }
}

// =============================================================================
// Filtering & Totals
// =============================================================================

/// Case-insensitive match on order id, payment method or cashier name.
/// A blank query keeps everything.
pub fn filter_orders(orders: Vec<Order>, query: &str) -> Vec<Order> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return orders;
    }

    orders
        .into_iter()
        .filter(|order| {
            order.id.to_lowercase().contains(&query)
                || order.payment_method.to_lowercase().contains(&query)
                || order
                    .cashier_name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&query))
        })
        .collect()
}

/// Headline figures for a set of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesTotals {
    pub revenue: Money,
    pub transaction_count: usize,
    /// Revenue / count, truncated; zero with no orders.
    pub average_basket: Money,
}

impl SalesTotals {
    pub fn from_orders(orders: &[Order]) -> Self {
        let revenue: Money = orders.iter().map(Order::total).sum();
        let transaction_count = orders.len();
        SalesTotals {
            revenue,
            transaction_count,
            average_basket: revenue.divide_by(transaction_count as i64),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// One page of results. Pages are 1-based.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slices `items` into page `page` of [`REPORT_PAGE_SIZE`] rows.
///
/// Page 0 is treated as page 1; a page past the end is empty.
///
/// ```rust
/// use resto_core::report::paginate;
///
/// let page = paginate((1..=45).collect::<Vec<_>>(), 3);
/// assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
/// assert_eq!(page.total_pages, 3);
/// ```
pub fn paginate<T>(items: Vec<T>, page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = REPORT_PAGE_SIZE;
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

// =============================================================================
// Sales Report
// =============================================================================

/// What the reports page renders.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesReport {
    pub range: DateRange,
    pub query: String,
    pub totals: SalesTotals,
    pub orders: Page<Order>,
}

/// Filters, totals and paginates the orders of `range`.
///
/// Totals cover the whole filtered set, not just the current page.
pub fn build_sales_report(
    range: DateRange,
    orders: Vec<Order>,
    query: &str,
    page: usize,
) -> SalesReport {
    let filtered = filter_orders(orders, query);
    let totals = SalesTotals::from_orders(&filtered);

    SalesReport {
        range,
        query: query.trim().to_string(),
        totals,
        orders: paginate(filtered, page),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
