//! # Domain Types
//!
//! Core domain records used throughout Resto POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌───────────────┐   owns 0..n   ┌───────────────┐  refs  ┌──────────┐ │
//! │  │   MenuItem    │──────────────►│  RecipeLine   │───────►│Ingredient│ │
//! │  │  price_minor  │               │ qty_needed    │        │ stock    │ │
//! │  │  is_active    │               │ (milli-units) │        │ uom      │ │
//! │  └───────────────┘               └───────────────┘        └──────────┘ │
//! │                                                                         │
//! │  ┌───────────────┐   owns 0..n   ┌───────────────┐  owns  ┌──────────┐ │
//! │  │  PosSession   │──────────────►│    Order      │───────►│OrderItem │ │
//! │  │ open → closed │               │ total_minor   │        │ snapshot │ │
//! │  │ starting_cash │               │ payment label │        │ price    │ │
//! │  └───────────────┘               └───────────────┘        └──────────┘ │
//! │                                                                         │
//! │  StaffProfile (PIN hash, role) • PaymentMethod (kind) • Settings       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Conventions
//! - Monetary fields end in `_minor` (integer minor units, see [`Money`])
//! - Ingredient quantities end in `_milli` (see [`Quantity`])
//! - Fields such as `category_name` or `cashier_name` are joined read-only
//!   columns, filled by the repository queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%; 1000 bps = 10%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a whole percentage (`10` = 10%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        TaxRate(percent * 100)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Cashier,
}

impl Role {
    /// Owners and admins manage settings, staff and payment methods.
    pub fn can_manage(&self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Cashier
    }
}

/// Shift session status. `Open -> Closed` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// How a tender is counted at shift close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Goes into the cash drawer.
    Cash,
    /// QRIS, cards, transfers, e-wallets.
    NonCash,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Ingredient
// =============================================================================

/// A stocked raw material.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Ingredient {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub sku: Option<String>,
    /// Unit of measure ("kg", "pcs", "liter").
    pub uom: String,
    pub current_stock_milli: i64,
    pub minimum_stock_alert_milli: i64,
    pub cost_per_unit_minor: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    #[inline]
    pub fn current_stock(&self) -> Quantity {
        Quantity::from_milli(self.current_stock_milli)
    }

    #[inline]
    pub fn minimum_stock_alert(&self) -> Quantity {
        Quantity::from_milli(self.minimum_stock_alert_milli)
    }

    /// Stock has dropped below the alert threshold.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock() < self.minimum_stock_alert()
    }

    /// Stock after an intake (positive delta) or write-off (negative).
    ///
    /// ## Errors
    /// `CoreError::InsufficientStock` if the result would be negative.
    pub fn stock_after(&self, delta: Quantity) -> CoreResult<Quantity> {
        let after = self
            .current_stock_milli
            .checked_add(delta.milli())
            .map(Quantity::from_milli)
            .ok_or_else(|| ValidationError::amount_overflow("stock"))?;
        if after.is_negative() {
            return Err(CoreError::InsufficientStock {
                name: self.name.clone(),
                available: format!("{} {}", self.current_stock(), self.uom),
                requested: format!(
                    "{} {}",
                    Quantity::from_milli(delta.milli().saturating_neg()),
                    self.uom
                ),
            });
        }
        Ok(after)
    }
}

// =============================================================================
// Recipe Line
// =============================================================================

/// One ingredient requirement of a menu item, joined with the ingredient's
/// current state at read time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecipeLine {
    pub id: String,
    pub menu_item_id: String,
    pub ingredient_id: String,
    pub quantity_needed_milli: i64,
    pub ingredient_name: String,
    pub ingredient_uom: String,
    pub ingredient_stock_milli: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl RecipeLine {
    #[inline]
    pub fn quantity_needed(&self) -> Quantity {
        Quantity::from_milli(self.quantity_needed_milli)
    }

    #[inline]
    pub fn ingredient_stock(&self) -> Quantity {
        Quantity::from_milli(self.ingredient_stock_milli)
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// A sellable dish or drink.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub category_id: Option<String>,
    /// Joined from `categories`.
    pub category_name: Option<String>,
    pub name: String,
    pub price_minor: i64,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub cooking_instructions: Option<String>,
    pub recipe_notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Recipe lines in stored order; loaded separately.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
}

impl MenuItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// A tender the cashier can pick at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentMethod {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub kind: PaymentKind,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order
// =============================================================================

/// A paid order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub restaurant_id: String,
    /// Null for orders placed before shift tracking existed.
    pub session_id: Option<String>,
    pub cashier_id: Option<String>,
    /// Joined from `staff_profiles`.
    pub cashier_name: Option<String>,
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
    /// Free-text tender label as chosen at checkout.
    pub payment_method: String,
    /// Explicit classification; `None` on legacy rows.
    pub payment_kind: Option<PaymentKind>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }

    /// The explicit tag when present, the label heuristic otherwise.
    pub fn payment_kind(&self) -> PaymentKind {
        self.payment_kind
            .unwrap_or_else(|| crate::shift::classify_payment(&self.payment_method))
    }
}

/// A line of a paid order. Name and price are frozen at sale time.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub price_at_time_minor: i64,
    pub line_total_minor: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Shift Session
// =============================================================================

/// A cashier shift bounded by an open and a close.
///
/// End-of-shift fields are `None` while open and fixed forever once closed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PosSession {
    pub id: String,
    pub restaurant_id: String,
    pub cashier_id: String,
    /// Joined from `staff_profiles`.
    pub cashier_name: Option<String>,
    pub status: SessionStatus,
    #[ts(as = "String")]
    pub start_time: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub end_time: Option<DateTime<Utc>>,
    pub starting_cash_minor: i64,
    pub ending_cash_minor: Option<i64>,
    pub total_cash_sales_minor: Option<i64>,
    pub total_non_cash_sales_minor: Option<i64>,
    pub variance_minor: Option<i64>,
    pub note: Option<String>,
}

impl PosSession {
    #[inline]
    pub fn starting_cash(&self) -> Money {
        Money::from_minor(self.starting_cash_minor)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

// =============================================================================
// Staff & Settings
// =============================================================================

/// A staff member who logs in with a PIN.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StaffProfile {
    pub id: String,
    pub restaurant_id: String,
    pub full_name: String,
    pub role: Role,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip)]
    #[ts(skip)]
    pub pin_hash: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Store identity printed on receipts, plus the sales tax rate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RestaurantSettings {
    pub id: String,
    pub name: String,
    pub receipt_header: String,
    pub receipt_address: String,
    pub receipt_phone: String,
    pub receipt_footer: String,
    pub tax_rate_bps: u32,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl RestaurantSettings {
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percent() {
        let rate = TaxRate::from_percent(10);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_role_can_manage() {
        assert!(Role::Owner.can_manage());
        assert!(Role::Admin.can_manage());
        assert!(!Role::Cashier.can_manage());
    }

    #[test]
    fn test_low_stock() {
        let now = Utc::now();
        let mut ingredient = Ingredient {
            id: "i-1".to_string(),
            restaurant_id: crate::DEFAULT_RESTAURANT_ID.to_string(),
            name: "Egg".to_string(),
            sku: None,
            uom: "pcs".to_string(),
            current_stock_milli: 4_000,
            minimum_stock_alert_milli: 5_000,
            cost_per_unit_minor: None,
            created_at: now,
            updated_at: now,
        };
        assert!(ingredient.is_low_stock());

        ingredient.current_stock_milli = 5_000;
        assert!(!ingredient.is_low_stock());

        assert_eq!(
            ingredient.stock_after(Quantity::from_units(-5)).unwrap(),
            Quantity::zero()
        );
        let err = ingredient.stock_after(Quantity::from_milli(-5_500)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Egg: available 5 pcs, requested 5.5 pcs"
        );

        assert!(matches!(
            ingredient.stock_after(Quantity::from_milli(i64::MAX)),
            Err(CoreError::Validation(ValidationError::AmountOverflow { .. }))
        ));
        assert!(matches!(
            ingredient.stock_after(Quantity::from_milli(i64::MIN)),
            Err(CoreError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_order_payment_kind_prefers_explicit_tag() {
        let mut order = Order {
            id: "o-1".to_string(),
            restaurant_id: crate::DEFAULT_RESTAURANT_ID.to_string(),
            session_id: None,
            cashier_id: None,
            cashier_name: None,
            subtotal_minor: 0,
            tax_minor: 0,
            total_minor: 0,
            payment_method: "Cashless Card".to_string(),
            payment_kind: None,
            created_at: Utc::now(),
        };
        assert_eq!(order.payment_kind(), PaymentKind::Cash);

        order.payment_kind = Some(PaymentKind::NonCash);
        assert_eq!(order.payment_kind(), PaymentKind::NonCash);
    }

    #[test]
    fn test_staff_pin_hash_not_serialized() {
        let staff = StaffProfile {
            id: "u-1".to_string(),
            restaurant_id: crate::DEFAULT_RESTAURANT_ID.to_string(),
            full_name: "Sari".to_string(),
            role: Role::Cashier,
            pin_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&staff).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"cashier\""));
    }
}
