//! # Error Types
//!
//! Domain-specific error types for resto-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  resto-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Malformed or out-of-range input                │
//! │                                                                         │
//! │  resto-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  resto-server errors                                                   │
//! │  └── ApiError         - What the pages see (JSON body + status)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Page                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inputs that are missing or malformed fail fast with a `ValidationError`.
//! Nothing in this crate silently treats absent data as zero.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Menu item cannot be sold right now.
    ///
    /// ## When This Occurs
    /// - Item is deactivated
    /// - A recipe ingredient is below the quantity needed
    #[error("{name} is unavailable: {reason}")]
    ItemUnavailable { name: String, reason: String },

    /// Shift session is closed and cannot be changed.
    ///
    /// Closing is terminal; there is no reopen.
    #[error("Shift {session_id} is already closed")]
    SessionAlreadyClosed { session_id: String },

    /// An order passed to the shift calculator belongs to a different shift.
    #[error("Order {order_id} does not belong to shift {session_id}")]
    OrderNotInSession { order_id: String, session_id: String },

    /// Checkout attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Menu item is not in the cart.
    #[error("Menu item {0} is not in the cart")]
    NotInCart(String),

    /// Stock adjustment would leave an ingredient below zero.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: String,
        requested: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, non-digit PIN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Arithmetic on amounts left the supported range.
    #[error("{field} exceeds the largest supported amount")]
    AmountOverflow { field: String },

    /// Duplicate value (e.g., a PIN already used by another staff member).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    pub fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    pub fn must_not_be_negative(field: &str) -> Self {
        ValidationError::MustNotBeNegative {
            field: field.to_string(),
        }
    }

    pub fn amount_overflow(field: &str) -> Self {
        ValidationError::AmountOverflow {
            field: field.to_string(),
        }
    }

    pub fn invalid_format(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ItemUnavailable {
            name: "Fried Rice".to_string(),
            reason: "Insufficient: Rice (0 kg left)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Fried Rice is unavailable: Insufficient: Rice (0 kg left)"
        );

        let err = CoreError::SessionAlreadyClosed {
            session_id: "s-1".to_string(),
        };
        assert_eq!(err.to_string(), "Shift s-1 is already closed");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");
        assert_eq!(
            ValidationError::must_not_be_negative("starting cash").to_string(),
            "starting cash must not be negative"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("pin").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
