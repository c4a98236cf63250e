//! # resto-core: Pure Business Logic for Resto POS
//!
//! This crate is the **heart** of Resto POS. It contains the restaurant's
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Resto POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Client-rendered pages (POS, Menu, Reports)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    resto-server (axum)                          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ resto-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ ┌───────┐ │   │
//! │  │  │availability│ │  shift   │ │   cart   │ │ report │ │ types │ │   │
//! │  │  │ stock/BOM  │ │ cash rec │ │ tax math │ │ totals │ │ money │ │   │
//! │  │  └────────────┘ └──────────┘ └──────────┘ └────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    resto-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Ingredient, MenuItem, Order, PosSession, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`quantity`] - Ingredient quantities in thousandths of a unit
//! - [`availability`] - Stock availability evaluation against a recipe
//! - [`shift`] - Shift open/summarize/close and cash reconciliation
//! - [`cart`] - Cashier cart and checkout totals
//! - [`report`] - Sales report filtering, totals and pagination
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use resto_core::money::Money;
//! use resto_core::types::TaxRate;
//!
//! let subtotal = Money::from_minor(45_000);
//! let tax = subtotal.calculate_tax(TaxRate::from_percent(10));
//! assert_eq!(tax.minor(), 4_500);
//! ```

pub mod availability;
pub mod cart;
pub mod error;
pub mod money;
pub mod quantity;
pub mod report;
pub mod shift;
pub mod types;
pub mod validation;

pub use availability::{evaluate, Availability, Shortfall};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default restaurant ID (single-restaurant runtime with multi-restaurant schema).
pub const DEFAULT_RESTAURANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single menu item in a cart.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest price, cash amount or cart subtotal accepted, in minor units.
pub const MAX_MONEY_MINOR: i64 = 1_000_000_000_000;

/// Minimum number of digits in a staff PIN.
pub const MIN_PIN_LENGTH: usize = 4;

/// Maximum number of digits in a staff PIN.
pub const MAX_PIN_LENGTH: usize = 6;

/// Rows per page on the sales report.
pub const REPORT_PAGE_SIZE: usize = 20;
