//! # State Module
//!
//! Shared application state handed to every handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  Router::with_state(AppState)   (cloned per request, all fields Arc)   │
//! │                              │                                          │
//! │     ┌───────────────┬────────┴────────┬─────────────────┐              │
//! │     ▼               ▼                 ▼                 ▼               │
//! │  ┌──────────┐  ┌──────────┐  ┌─────────────────┐  ┌──────────────┐     │
//! │  │ Database │  │  Config  │  │   CartStore     │  │ RevokedTokens│     │
//! │  │ (SQLite  │  │ JwtMgr   │  │ Mutex<HashMap<  │  │ RwLock<      │     │
//! │  │  pool)   │  │ (r/o)    │  │  user, Cart>>   │  │  HashMap>    │     │
//! │  └──────────┘  └──────────┘  └─────────────────┘  └──────────────┘     │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Database: internal connection pool                                  │
//! │  • CartStore: std Mutex, never held across .await                      │
//! │  • RevokedTokens: tokio RwLock, many readers on every request          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod revoked;

pub use cart::CartStore;
pub use revoked::RevokedTokens;

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::ServerConfig;
use resto_db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
    pub jwt: Arc<JwtManager>,
    pub carts: Arc<CartStore>,
    pub revoked: Arc<RevokedTokens>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.token_lifetime_secs);

        AppState {
            db,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            carts: Arc::new(CartStore::new()),
            revoked: Arc::new(RevokedTokens::new()),
        }
    }

    /// The restaurant this instance serves.
    pub fn restaurant_id(&self) -> &str {
        &self.config.restaurant_id
    }
}
