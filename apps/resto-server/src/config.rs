//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use directories::ProjectDirs;
use resto_core::{validation::validate_pin, DEFAULT_RESTAURANT_ID};

/// Secret used when `RESTO_JWT_SECRET` is unset. Development only.
pub const DEV_JWT_SECRET: &str = "resto-dev-secret-change-in-production";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server listens on
    pub bind_addr: SocketAddr,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pooled connections
    pub db_max_connections: u32,

    /// Restaurant served by this instance
    pub restaurant_id: String,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// Bearer token lifetime in seconds
    pub token_lifetime_secs: i64,

    /// PIN that logs in as the built-in owner, if set
    pub bootstrap_pin: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match lookup("RESTO_DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_database_path()?,
        };

        let bootstrap_pin = lookup("RESTO_BOOTSTRAP_PIN").filter(|p| !p.is_empty());
        if let Some(pin) = &bootstrap_pin {
            validate_pin(pin)
                .map_err(|_| ConfigError::InvalidValue("RESTO_BOOTSTRAP_PIN".to_string()))?;
        }

        let config = ServerConfig {
            bind_addr: lookup("RESTO_BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RESTO_BIND_ADDR".to_string()))?,

            database_path,

            db_max_connections: lookup("RESTO_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RESTO_DB_MAX_CONNECTIONS".to_string()))?,

            restaurant_id: lookup("RESTO_RESTAURANT_ID")
                .unwrap_or_else(|| DEFAULT_RESTAURANT_ID.to_string()),

            jwt_secret: lookup("RESTO_JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            token_lifetime_secs: lookup("RESTO_TOKEN_LIFETIME_SECS")
                .unwrap_or_else(|| "43200".to_string()) // 12 hours
                .parse()
                .map_err(|_| ConfigError::InvalidValue("RESTO_TOKEN_LIFETIME_SECS".to_string()))?,

            bootstrap_pin,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("RESTO_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("RESTO_TOKEN_LIFETIME_SECS".to_string()));
        }
        if config.restaurant_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue("RESTO_RESTAURANT_ID".to_string()));
        }

        Ok(config)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Platform data directory:
/// - **macOS**: `~/Library/Application Support/com.resto.pos/resto.db`
/// - **Windows**: `%APPDATA%\resto\pos\data\resto.db`
/// - **Linux**: `~/.local/share/pos/resto.db`
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "resto", "pos")
        .ok_or_else(|| ConfigError::MissingRequired("RESTO_DB_PATH".to_string()))?;

    Ok(proj_dirs.data_dir().join("resto.db"))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("RESTO_DB_PATH", "/tmp/resto.db")]).unwrap();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.restaurant_id, DEFAULT_RESTAURANT_ID);
        assert_eq!(config.token_lifetime_secs, 43_200);
        assert!(config.bootstrap_pin.is_none());
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("RESTO_DB_PATH", "/tmp/resto.db"),
            ("RESTO_BIND_ADDR", "0.0.0.0:9000"),
            ("RESTO_JWT_SECRET", "s3cret"),
            ("RESTO_BOOTSTRAP_PIN", "246810"),
            ("RESTO_TOKEN_LIFETIME_SECS", "600"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.bootstrap_pin.as_deref(), Some("246810"));
        assert_eq!(config.token_lifetime_secs, 600);
        assert!(!config.uses_dev_secret());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("RESTO_DB_PATH", "x.db"), ("RESTO_BIND_ADDR", "nope")]),
            Err(ConfigError::InvalidValue(key)) if key == "RESTO_BIND_ADDR"
        ));
        assert!(matches!(
            load(&[("RESTO_DB_PATH", "x.db"), ("RESTO_BOOTSTRAP_PIN", "12ab")]),
            Err(ConfigError::InvalidValue(key)) if key == "RESTO_BOOTSTRAP_PIN"
        ));
        assert!(load(&[("RESTO_DB_PATH", "x.db"), ("RESTO_TOKEN_LIFETIME_SECS", "0")]).is_err());
    }
}
