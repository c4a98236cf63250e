//! # Revoked Tokens
//!
//! Token ids (`jti`) ended by logout. Entries are kept until the token would
//! have expired anyway, then pruned.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct RevokedTokens {
    /// jti → expiry (Unix timestamp)
    inner: RwLock<HashMap<String, i64>>,
}

impl RevokedTokens {
    pub fn new() -> Self {
        RevokedTokens::default()
    }

    pub async fn revoke(&self, jti: &str, exp: i64) {
        let now = Utc::now().timestamp();
        let mut revoked = self.inner.write().await;
        revoked.retain(|_, expires| *expires > now);
        revoked.insert(jti.to_string(), exp);
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.inner.read().await.contains_key(jti)
    }
}
