//! # resto-db: Database Layer for Resto POS
//!
//! SQLite persistence for the restaurant: catalog, recipes, stock, shifts,
//! orders, staff and settings. Queries run through sqlx at runtime and map
//! rows straight onto the records defined in `resto-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Resto POS Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/pos/checkout)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     resto-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ MenuRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SessionRepo   │    │ 001_initial  │  │   │
//! │  │   │ WAL, FKs on   │    │ OrderRepo ... │    │   _schema    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/resto.db                                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per aggregate
//!
//! ## Usage
//!
//! ```rust,ignore
//! use resto_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("resto.db")).await?;
//!
//! let menu = db.menu().list_for_pos(restaurant_id, "rice", None).await?;
//! let shift = db.sessions().current_open(restaurant_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::ingredient::IngredientRepository;
pub use repository::menu::MenuRepository;
pub use repository::order::OrderRepository;
pub use repository::session::SessionRepository;
pub use repository::settings::{PaymentMethodRepository, SettingsRepository};
pub use repository::staff::{hash_pin, verify_pin, StaffRepository};
