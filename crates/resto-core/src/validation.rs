//! # Validation Module
//!
//! Input validation rules for Resto POS.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (resto-server)                                  │
//! │  ├── JSON shape (deserialization)                                      │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Pure rules (availability, shift, cart)                       │
//! │  └── Fail fast on malformed records                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK / NOT NULL constraints                                      │
//! │  ├── UNIQUE (one open shift per restaurant)                            │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use resto_core::validation::{validate_pin, validate_quantity};
//!
//! assert!(validate_pin("123456").is_ok());
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::{MAX_ITEM_QUANTITY, MAX_MONEY_MINOR, MAX_PIN_LENGTH, MIN_PIN_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound for display names (menu items, ingredients, staff, ...).
pub const MAX_NAME_LENGTH: usize = 200;

/// Upper bound for free-text fields (notes, instructions, receipt text).
pub const MAX_TEXT_LENGTH: usize = 2000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required display name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use resto_core::validation::validate_name;
///
/// assert_eq!(validate_name("name", "  Fried Rice ").unwrap(), "Fried Rice");
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Normalizes an optional free-text field: trims, maps blank to `None`.
pub fn validate_optional_text(
    field: &str,
    text: Option<&str>,
) -> ValidationResult<Option<String>> {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }

    Ok(Some(text.to_string()))
}

/// Validates an ingredient SKU.
///
/// Letters, digits, hyphens and underscores; at most 50 characters.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "sku",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validates a staff PIN.
///
/// ## Rules
/// - 4 to 6 characters
/// - ASCII digits only
///
/// ```text
/// "1234"    → Ok
/// "123456"  → Ok
/// "123"     → OutOfRange
/// "12a4"    → InvalidFormat
/// ```
pub fn validate_pin(pin: &str) -> ValidationResult<()> {
    let len = pin.len();

    if pin.is_empty() {
        return Err(ValidationError::required("pin"));
    }

    if !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format("pin", "must contain only digits"));
    }

    if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&len) {
        return Err(ValidationError::OutOfRange {
            field: "pin length".to_string(),
            min: MIN_PIN_LENGTH as i64,
            max: MAX_PIN_LENGTH as i64,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// Empty is allowed (no filter); at most 100 characters.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart line quantity (1..=999).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in minor units (`0..=MAX_MONEY_MINOR`).
///
/// ```rust
/// use resto_core::validation::validate_price;
///
/// assert!(validate_price(25_000).is_ok());
/// assert!(validate_price(0).is_ok());
/// assert!(validate_price(-1).is_err());
/// assert!(validate_price(i64::MAX).is_err());
/// ```
pub fn validate_price(minor: i64) -> ValidationResult<()> {
    validate_money("price", minor)
}

/// Validates a counted or starting cash amount (`0..=MAX_MONEY_MINOR`).
pub fn validate_cash_amount(field: &str, minor: i64) -> ValidationResult<()> {
    validate_money(field, minor)
}

fn validate_money(field: &str, minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::must_not_be_negative(field));
    }

    if minor > MAX_MONEY_MINOR {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_MINOR,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates the quantity a recipe line consumes. Must be positive.
pub fn validate_recipe_quantity(qty: Quantity) -> ValidationResult<()> {
    if !qty.is_positive() {
        return Err(ValidationError::must_be_positive("quantity needed"));
    }

    Ok(())
}

/// Validates an ingredient stock level or alert threshold.
pub fn validate_stock_level(field: &str, qty: Quantity) -> ValidationResult<()> {
    if qty.is_negative() {
        return Err(ValidationError::must_not_be_negative(field));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
