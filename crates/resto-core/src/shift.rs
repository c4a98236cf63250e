//! # Shift Reconciliation
//!
//! Opening, summarizing and closing a cashier shift.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   open(starting_cash)          orders accumulate          close(count) │
//! │  ───────────────────► [OPEN] ─────────────────────► [CLOSED] (terminal)│
//! │                                                                         │
//! │  At close:                                                              │
//! │    cash_total      = Σ total of orders classified Cash                 │
//! │    non_cash_total  = Σ total of every other order                      │
//! │    expected_cash   = starting_cash + cash_total                        │
//! │    variance        = counted_cash - expected_cash                      │
//! │                                                                         │
//! │  Variance is reported, never enforced: a shift with a shortage still   │
//! │  closes. Closed figures are frozen and never recomputed.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payment Classification
//! An order's explicit [`PaymentKind`] wins. Untagged orders fall back to
//! [`classify_payment`], a case-insensitive substring match on the label
//! against `"cash"` and `"tunai"`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Order, PaymentKind, PosSession, SessionStatus};
use crate::validation::{validate_cash_amount, validate_optional_text};

/// Label tokens that mark a tender as cash ("tunai" is Indonesian for cash).
const CASH_TOKENS: [&str; 2] = ["cash", "tunai"];

// =============================================================================
// Classification
// =============================================================================

/// Classifies a free-text payment label.
///
/// ```rust
/// use resto_core::shift::classify_payment;
/// use resto_core::types::PaymentKind;
///
/// assert_eq!(classify_payment("Cash"), PaymentKind::Cash);
/// assert_eq!(classify_payment("TUNAI"), PaymentKind::Cash);
/// assert_eq!(classify_payment("QRIS"), PaymentKind::NonCash);
/// ```
pub fn classify_payment(label: &str) -> PaymentKind {
    let label = label.to_lowercase();
    if CASH_TOKENS.iter().any(|token| label.contains(token)) {
        PaymentKind::Cash
    } else {
        PaymentKind::NonCash
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Running figures for a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShiftSummary {
    pub session_id: String,
    pub starting_cash: Money,
    pub cash_total: Money,
    pub non_cash_total: Money,
    pub expected_cash: Money,
    pub cash_order_count: usize,
    pub non_cash_order_count: usize,
}

impl ShiftSummary {
    /// Every sale of the shift regardless of tender.
    pub fn total_sales(&self) -> Money {
        self.cash_total + self.non_cash_total
    }

    pub fn order_count(&self) -> usize {
        self.cash_order_count + self.non_cash_order_count
    }
}

/// Result of [`close`]: the closed session plus the reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShiftClosure {
    pub session: PosSession,
    pub summary: ShiftSummary,
    pub counted_cash: Money,
    /// Positive is an overage, negative a shortage.
    pub variance: Money,
}

// =============================================================================
// Operations
// =============================================================================

/// Opens a new shift.
///
/// Uniqueness of the open shift is the database's concern.
pub fn open(
    restaurant_id: &str,
    cashier_id: &str,
    starting_cash: Money,
    now: DateTime<Utc>,
) -> CoreResult<PosSession> {
    if cashier_id.trim().is_empty() {
        return Err(ValidationError::required("cashier").into());
    }
    validate_cash_amount("starting cash", starting_cash.minor())?;

    Ok(PosSession {
        id: Uuid::new_v4().to_string(),
        restaurant_id: restaurant_id.to_string(),
        cashier_id: cashier_id.to_string(),
        cashier_name: None,
        status: SessionStatus::Open,
        start_time: now,
        end_time: None,
        starting_cash_minor: starting_cash.minor(),
        ending_cash_minor: None,
        total_cash_sales_minor: None,
        total_non_cash_sales_minor: None,
        variance_minor: None,
        note: None,
    })
}

/// Splits a shift's orders into cash and non-cash totals.
///
/// ## Errors
/// - `OrderNotInSession` if an order is not attached to `session`
/// - `Validation` for out-of-range starting cash, a negative order total,
///   or totals that overflow
pub fn summarize(session: &PosSession, orders: &[Order]) -> CoreResult<ShiftSummary> {
    validate_cash_amount("starting cash", session.starting_cash_minor)?;

    let mut summary = ShiftSummary {
        session_id: session.id.clone(),
        starting_cash: session.starting_cash(),
        cash_total: Money::zero(),
        non_cash_total: Money::zero(),
        expected_cash: Money::zero(),
        cash_order_count: 0,
        non_cash_order_count: 0,
    };

    for order in orders {
        if order.session_id.as_deref() != Some(session.id.as_str()) {
            return Err(CoreError::OrderNotInSession {
                order_id: order.id.clone(),
                session_id: session.id.clone(),
            });
        }
        if order.total_minor < 0 {
            return Err(ValidationError::must_not_be_negative("order total").into());
        }

        let (total, count) = match order.payment_kind() {
            PaymentKind::Cash => (&mut summary.cash_total, &mut summary.cash_order_count),
            PaymentKind::NonCash => (&mut summary.non_cash_total, &mut summary.non_cash_order_count),
        };
        *total = total
            .checked_add(order.total())
            .ok_or_else(|| ValidationError::amount_overflow("shift sales"))?;
        *count += 1;
    }

    // total_sales() must stay representable too.
    summary
        .cash_total
        .checked_add(summary.non_cash_total)
        .ok_or_else(|| ValidationError::amount_overflow("shift sales"))?;

    summary.expected_cash = summary
        .starting_cash
        .checked_add(summary.cash_total)
        .ok_or_else(|| ValidationError::amount_overflow("expected cash"))?;
    Ok(summary)
}

/// Closes an open shift against the counted drawer.
///
/// Succeeds whatever the variance. The returned session carries the frozen
/// end-of-shift figures and is what gets persisted.
///
/// ## Errors
/// - `SessionAlreadyClosed` if the session is not open
/// - `Validation` for a negative count or an oversized note
/// - anything [`summarize`] rejects
pub fn close(
    session: &PosSession,
    orders: &[Order],
    counted_cash: Money,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> CoreResult<ShiftClosure> {
    if !session.is_open() {
        return Err(CoreError::SessionAlreadyClosed {
            session_id: session.id.clone(),
        });
    }
    validate_cash_amount("counted cash", counted_cash.minor())?;
    let note = validate_optional_text("note", note)?;

    let summary = summarize(session, orders)?;
    let variance = counted_cash
        .checked_sub(summary.expected_cash)
        .ok_or_else(|| ValidationError::amount_overflow("variance"))?;

    let closed = PosSession {
        status: SessionStatus::Closed,
        end_time: Some(now),
        ending_cash_minor: Some(counted_cash.minor()),
        total_cash_sales_minor: Some(summary.cash_total.minor()),
        total_non_cash_sales_minor: Some(summary.non_cash_total.minor()),
        variance_minor: Some(variance.minor()),
        note,
        ..session.clone()
    };

    Ok(ShiftClosure {
        session: closed,
        summary,
        counted_cash,
        variance,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
