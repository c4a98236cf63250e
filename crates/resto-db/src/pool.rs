//! # Pool
//!
//! Opens the SQLite file behind the Resto API and hands out repositories.
//!
//! ## Who Opens It
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resto-server serve() ──► DbConfig::new(RESTO_DB_PATH)                  │
//! │  seed binary ──────────► DbConfig::new(--db path)                       │
//! │  tests ────────────────► DbConfig::in_memory()                          │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  Database::new ── pragmas ── pool ── migrations/sqlite/*.sql            │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  AppState.db (cloned into every axum handler)                           │
//! │      .menu()  .orders()  .sessions()  .staff()  .settings() ...         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pragmas
//! | pragma        | value  | reason                                        |
//! |---------------|--------|-----------------------------------------------|
//! | journal_mode  | WAL    | report scans run while checkout writes        |
//! | synchronous   | NORMAL | WAL makes this durable against corruption     |
//! | foreign_keys  | ON     | recipe lines pin their ingredients            |

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::ingredient::IngredientRepository;
use crate::repository::menu::MenuRepository;
use crate::repository::order::OrderRepository;
use crate::repository::session::SessionRepository;
use crate::repository::settings::{PaymentMethodRepository, SettingsRepository};
use crate::repository::staff::StaffRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings. The server sets `max_connections` from
/// `RESTO_DB_MAX_CONNECTIONS`; everything else keeps its default.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("data/resto.db").max_connections(8)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Default 5.
    pub max_connections: u32,

    /// Default 1.
    pub min_connections: u32,

    /// How long a handler waits for a free connection. Default 30s.
    pub connect_timeout: Duration,

    /// Default 10 minutes.
    pub idle_timeout: Duration,

    /// Apply `migrations/sqlite` on connect. Default on; the seed binary
    /// relies on it.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Settings for the file at `path`, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A private throwaway database for tests.
    ///
    /// Pinned to one connection: every `:memory:` connection is a separate
    /// empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle over the pool. Clones share connections, so `AppState`
/// holds one and every handler reaches its repository through it:
///
/// ```rust,ignore
/// let open = state.db.sessions().current_open(state.restaurant_id()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects with the pragmas above, then migrates unless
    /// `run_migrations` is off.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies any schema files not yet recorded in `_sqlx_migrations`.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn ingredients(&self) -> IngredientRepository {
        IngredientRepository::new(self.pool.clone())
    }

    /// Menu items and their recipe lines.
    pub fn menu(&self) -> MenuRepository {
        MenuRepository::new(self.pool.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Shift sessions.
    pub fn sessions(&self) -> SessionRepository {
        SessionRepository::new(self.pool.clone())
    }

    pub fn staff(&self) -> StaffRepository {
        StaffRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    pub fn payment_methods(&self) -> PaymentMethodRepository {
        PaymentMethodRepository::new(self.pool.clone())
    }

    /// Drains the pool on server shutdown.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Backs `GET /api/health`.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// `(total, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
