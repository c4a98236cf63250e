//! # Cart
//!
//! The cashier's working order and the math that turns it into a sale.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier Action        Operation                 Cart Change            │
//! │  ──────────────        ─────────                 ───────────            │
//! │  Tap menu item  ─────► add_item(item, 1) ──────► line += 1 / push      │
//! │  Tap + / -      ─────► adjust_quantity(id, ±1) ► qty clamps at 0,      │
//! │                                                  zero lines removed    │
//! │  Remove         ─────► remove_item(id) ────────► line removed          │
//! │  Pay            ─────► draft_order(...) ───────► Order + OrderItems    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! Tax applies once to the subtotal at the restaurant's rate, not per line:
//! `tax = round_half_up(subtotal × rate)`, `total = subtotal + tax`.
//!
//! The subtotal never exceeds [`MAX_MONEY_MINOR`]; adds and adjustments
//! that would cross it are refused.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{MenuItem, Order, OrderItem, PaymentMethod, PosSession, TaxRate};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_MONEY_MINOR};

// =============================================================================
// Cart Item
// =============================================================================

/// A cart line. Name and price are frozen when the item is first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn from_menu_item(item: &MenuItem, quantity: i64) -> Self {
        CartItem {
            menu_item_id: item.id.clone(),
            name: item.name.clone(),
            unit_price: item.price(),
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.unit_price
            .checked_mul(self.quantity)
            .ok_or_else(|| ValidationError::amount_overflow("line total").into())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cashier's cart.
///
/// ## Invariants
/// - One line per menu item
/// - Every line has `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
/// - Subtotal at most `MAX_MONEY_MINOR`
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cart {
    pub items: Vec<CartItem>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds `quantity` of a menu item, merging with an existing line.
    pub fn add_item(&mut self, item: &MenuItem, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;
        let subtotal = self.subtotal()?;

        if let Some(line) = self.find_mut(&item.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            ensure_subtotal_fits(subtotal, line.unit_price, quantity)?;
            line.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        let line = CartItem::from_menu_item(item, quantity);
        ensure_subtotal_fits(subtotal, line.unit_price, quantity)?;
        self.items.push(line);
        Ok(())
    }

    /// Changes a line by `delta`. The quantity clamps at zero and a line
    /// that reaches zero is dropped.
    pub fn adjust_quantity(&mut self, menu_item_id: &str, delta: i64) -> CoreResult<()> {
        let line = self
            .items
            .iter()
            .find(|i| i.menu_item_id == menu_item_id)
            .ok_or_else(|| CoreError::NotInCart(menu_item_id.to_string()))?;

        let new_qty = line.quantity.saturating_add(delta).max(0);
        if new_qty > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_qty,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if new_qty > line.quantity {
            ensure_subtotal_fits(self.subtotal()?, line.unit_price, new_qty - line.quantity)?;
        }

        self.items.retain_mut(|i| {
            if i.menu_item_id == menu_item_id {
                i.quantity = new_qty;
            }
            i.quantity > 0
        });
        Ok(())
    }

    pub fn remove_item(&mut self, menu_item_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.menu_item_id != menu_item_id);

        if self.items.len() == initial_len {
            Err(CoreError::NotInCart(menu_item_id.to_string()))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> CoreResult<Money> {
        self.items.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.line_total()?)
                .ok_or_else(|| ValidationError::amount_overflow("subtotal").into())
        })
    }

    pub fn totals(&self, tax_rate: TaxRate) -> CoreResult<CartTotals> {
        let subtotal = self.subtotal()?;
        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal
            .checked_add(tax)
            .ok_or_else(|| ValidationError::amount_overflow("total"))?;

        Ok(CartTotals {
            item_count: self.item_count(),
            total_quantity: self.total_quantity(),
            subtotal,
            tax,
            total,
        })
    }

    fn find_mut(&mut self, menu_item_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.menu_item_id == menu_item_id)
    }
}

fn ensure_subtotal_fits(subtotal: Money, unit_price: Money, added: i64) -> CoreResult<()> {
    let next = unit_price
        .checked_mul(added)
        .and_then(|extra| subtotal.checked_add(extra))
        .filter(|next| next.minor() <= MAX_MONEY_MINOR);

    match next {
        Some(_) => Ok(()),
        None => Err(ValidationError::OutOfRange {
            field: "subtotal".to_string(),
            min: 0,
            max: MAX_MONEY_MINOR,
        }
        .into()),
    }
}

/// Cart totals for display and checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

// =============================================================================
// Checkout
// =============================================================================

/// Turns a cart into an order and its lines, attached to the open shift.
///
/// Sellability of each item is checked by the caller against fresh menu
/// data; this function only assembles the records.
///
/// ## Errors
/// - `EmptyCart`
/// - `SessionAlreadyClosed` if `session` is not open
pub fn draft_order(
    cart: &Cart,
    tax_rate: TaxRate,
    session: &PosSession,
    cashier_id: &str,
    payment: &PaymentMethod,
    now: DateTime<Utc>,
) -> CoreResult<(Order, Vec<OrderItem>)> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    if !session.is_open() {
        return Err(CoreError::SessionAlreadyClosed {
            session_id: session.id.clone(),
        });
    }

    let totals = cart.totals(tax_rate)?;
    let order_id = Uuid::new_v4().to_string();

    let order = Order {
        id: order_id.clone(),
        restaurant_id: session.restaurant_id.clone(),
        session_id: Some(session.id.clone()),
        cashier_id: Some(cashier_id.to_string()),
        cashier_name: None,
        subtotal_minor: totals.subtotal.minor(),
        tax_minor: totals.tax.minor(),
        total_minor: totals.total.minor(),
        payment_method: payment.name.clone(),
        payment_kind: Some(payment.kind),
        created_at: now,
    };

    let items = cart
        .items
        .iter()
        .map(|line| {
            Ok(OrderItem {
                id: Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                menu_item_id: line.menu_item_id.clone(),
                name_snapshot: line.name.clone(),
                quantity: line.quantity,
                price_at_time_minor: line.unit_price.minor(),
                line_total_minor: line.line_total()?.minor(),
                created_at: now,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    Ok((order, items))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentKind;

    fn menu_item(id: &str, price_minor: i64) -> MenuItem {
        let now = Utc::now();
        MenuItem {
            id: id.to_string(),
            restaurant_id: crate::DEFAULT_RESTAURANT_ID.to_string(),
            category_id: None,
            category_name: None,
            name: format!("Item {}", id),
            price_minor,
            is_active: true,
            image_url: None,
            cooking_instructions: None,
            recipe_notes: None,
            created_at: now,
            updated_at: now,
            recipe: Vec::new(),
        }
    }

    fn qris() -> PaymentMethod {
        PaymentMethod {
            id: "pm-1".to_string(),
            restaurant_id: crate::DEFAULT_RESTAURANT_ID.to_string(),
            name: "QRIS".to_string(),
            kind: PaymentKind::NonCash,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_same_item_merges() {
        let mut cart = Cart::new();
        let item = menu_item("1", 25_000);

        cart.add_item(&item, 2).unwrap();
        cart.add_item(&item, 1).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.subtotal().unwrap().minor(), 75_000);
    }

    #[test]
    fn test_price_frozen_at_add() {
        let mut cart = Cart::new();
        let mut item = menu_item("1", 10_000);
        cart.add_item(&item, 1).unwrap();

        item.price_minor = 99_000;
        cart.add_item(&item, 1).unwrap();

        assert_eq!(cart.subtotal().unwrap().minor(), 20_000);
    }

    #[test]
    fn test_adjust_quantity_clamps_and_removes() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item("1", 1_000), 2).unwrap();

        cart.adjust_quantity("1", 1).unwrap();
        assert_eq!(cart.total_quantity(), 3);

        cart.adjust_quantity("1", -10).unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.adjust_quantity("1", 1),
            Err(CoreError::NotInCart(_))
        ));
    }

    #[test]
    fn test_limits() {
        let mut cart = Cart::new();
        let item = menu_item("1", 1_000);
        cart.add_item(&item, 999).unwrap();
        assert!(matches!(
            cart.add_item(&item, 1),
            Err(CoreError::QuantityTooLarge { .. })
        ));
        assert!(cart.add_item(&item, 0).is_err());

        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add_item(&menu_item(&i.to_string(), 100), 1).unwrap();
        }
        assert!(matches!(
            cart.add_item(&menu_item("extra", 100), 1),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_subtotal_capped() {
        let mut cart = Cart::new();
        let pricey = menu_item("1", MAX_MONEY_MINOR);
        cart.add_item(&pricey, 1).unwrap();

        assert!(matches!(
            cart.add_item(&pricey, 1),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(cart.add_item(&menu_item("2", 1), 1).is_err());
        assert!(cart.adjust_quantity("1", 1).is_err());
        assert_eq!(cart.total_quantity(), 1);

        // Full tax on the largest subtotal still fits.
        let totals = cart.totals(TaxRate::from_bps(10_000)).unwrap();
        assert_eq!(totals.total.minor(), 2 * MAX_MONEY_MINOR);

        // Shrinking never needs headroom.
        cart.adjust_quantity("1", -1).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_overflowing_price_rejected() {
        let mut cart = Cart::new();
        let err = cart.add_item(&menu_item("1", i64::MAX), 2).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_with_tax() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item("1", 25_000), 1).unwrap();
        cart.add_item(&menu_item("2", 20_000), 1).unwrap();

        let totals = cart.totals(TaxRate::from_percent(10)).unwrap();
        assert_eq!(totals.subtotal.minor(), 45_000);
        assert_eq!(totals.tax.minor(), 4_500);
        assert_eq!(totals.total.minor(), 49_500);
    }

    #[test]
    fn test_draft_order() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item("1", 25_000), 2).unwrap();

        let shift = crate::shift::open(
            crate::DEFAULT_RESTAURANT_ID,
            "cashier-1",
            Money::from_minor(100_000),
            Utc::now(),
        )
        .unwrap();

        let (order, items) = draft_order(
            &cart,
            TaxRate::from_percent(10),
            &shift,
            "cashier-1",
            &qris(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(order.session_id.as_deref(), Some(shift.id.as_str()));
        assert_eq!(order.total_minor, 55_000);
        assert_eq!(order.payment_kind, Some(PaymentKind::NonCash));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, order.id);
        assert_eq!(items[0].line_total_minor, 50_000);
    }

    #[test]
    fn test_draft_order_rejects_empty_cart() {
        let shift = crate::shift::open(
            crate::DEFAULT_RESTAURANT_ID,
            "cashier-1",
            Money::zero(),
            Utc::now(),
        )
        .unwrap();

        let err = draft_order(
            &Cart::new(),
            TaxRate::zero(),
            &shift,
            "cashier-1",
            &qris(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }
}
