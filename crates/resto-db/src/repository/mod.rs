//! # Repository Module
//!
//! Database repository implementations for Resto POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.menu().list(restaurant_id)                                 │
//! │       ▼                                                                 │
//! │  MenuRepository                                                        │
//! │  ├── list / get_by_id / insert / update / delete                       │
//! │  └── recipe_lines / add_recipe_line / remove_recipe_line               │
//! │       │                                                                 │
//! │       │  SQL (sqlx, runtime-checked, mapped with FromRow)              │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories return resto-core records and never apply business rules;
//! the handler loads, asks resto-core, then writes.
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`] - Menu categories
//! - [`IngredientRepository`] - Ingredients and stock intake
//! - [`MenuRepository`] - Menu items and recipe lines
//! - [`OrderRepository`] - Paid orders and their lines
//! - [`SessionRepository`] - Shift sessions
//! - [`StaffRepository`] - Staff profiles and PIN hashes
//! - [`SettingsRepository`] / [`PaymentMethodRepository`] - Store settings
//!
//! [`CategoryRepository`]: category::CategoryRepository
//! [`IngredientRepository`]: ingredient::IngredientRepository
//! [`MenuRepository`]: menu::MenuRepository
//! [`OrderRepository`]: order::OrderRepository
//! [`SessionRepository`]: session::SessionRepository
//! [`StaffRepository`]: staff::StaffRepository
//! [`SettingsRepository`]: settings::SettingsRepository
//! [`PaymentMethodRepository`]: settings::PaymentMethodRepository

pub mod category;
pub mod ingredient;
pub mod menu;
pub mod order;
pub mod session;
pub mod settings;
pub mod staff;

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
