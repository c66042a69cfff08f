//! # Ledger API Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHIFTBOOK_PORT=9090                                                │
//! │     SHIFTBOOK_JWT_SECRET=...                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/shiftbook/ledger.toml (Linux)                            │
//! │     ~/Library/Application Support/com.shiftbook.shiftbook/ (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # ledger.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/shiftbook/shiftbook.db"
//! max_connections = 5
//!
//! [register]
//! id = "till-1"
//! name = "Front counter"
//!
//! [auth]
//! jwt_secret = "change-me-to-a-long-random-string"
//! token_lifetime_secs = 43200
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

const DEV_JWT_SECRET: &str = "shiftbook-dev-secret-change-in-production";

// =============================================================================
// Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// SQLite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file; defaults to `shiftbook.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// The till this process is the single writer for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSettings {
    #[serde(default = "default_register_id")]
    pub id: String,

    #[serde(default = "default_register_name")]
    pub name: String,
}

fn default_register_id() -> String {
    "till-1".to_string()
}

fn default_register_name() -> String {
    "Register 1".to_string()
}

impl Default for RegisterSettings {
    fn default() -> Self {
        RegisterSettings {
            id: default_register_id(),
            name: default_register_name(),
        }
    }
}

/// Bearer token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Lifetime of tokens issued by `ledger-api issue-token`.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: i64,
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_token_lifetime() -> i64 {
    12 * 60 * 60 // one long shift
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: default_jwt_secret(),
            token_lifetime_secs: default_token_lifetime(),
        }
    }
}

// =============================================================================
// Ledger Configuration
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub register: RegisterSettings,

    #[serde(default)]
    pub auth: AuthSettings,
}

impl LedgerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (ledger.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading ledger config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        if config.auth.jwt_secret == DEV_JWT_SECRET {
            warn!("Using the development JWT secret; set SHIFTBOOK_JWT_SECRET in production");
        }

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.register.id.trim().is_empty() {
            return Err(ConfigError::MissingRequired("register.id".into()));
        }

        if self.auth.jwt_secret.len() < 16 {
            return Err(ConfigError::InvalidValue(
                "auth.jwt_secret must be at least 16 bytes".into(),
            ));
        }

        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.token_lifetime_secs must be positive".into(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Resolved database file path.
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("com", "shiftbook", "shiftbook")
                    .map(|dirs| dirs.data_dir().join("shiftbook.db"))
            })
            .unwrap_or_else(|| PathBuf::from("shiftbook.db"))
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(addr) = std::env::var("SHIFTBOOK_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("SHIFTBOOK_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHIFTBOOK_PORT".into()))?;
            debug!(port = self.server.port, "Overriding port from environment");
        }

        if let Ok(path) = std::env::var("SHIFTBOOK_DATABASE_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(id) = std::env::var("SHIFTBOOK_REGISTER_ID") {
            debug!(register_id = %id, "Overriding register ID from environment");
            self.register.id = id;
        }

        if let Ok(secret) = std::env::var("SHIFTBOOK_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(lifetime) = std::env::var("SHIFTBOOK_TOKEN_LIFETIME_SECS") {
            self.auth.token_lifetime_secs = lifetime
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SHIFTBOOK_TOKEN_LIFETIME_SECS".into()))?;
        }

        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shiftbook", "shiftbook")
            .map(|dirs| dirs.config_dir().join("ledger.toml"))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LedgerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.register.id, "till-1");
    }

    #[test]
    fn test_validation() {
        let mut config = LedgerConfig::default();
        config.auth.jwt_secret = "short".into();
        assert!(config.validate().is_err());

        let mut config = LedgerConfig::default();
        config.register.id = " ".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LedgerConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [register]
            id = "bar-2"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.register.id, "bar-2");
        assert_eq!(config.register.name, "Register 1");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_explicit_database_path() {
        let mut config = LedgerConfig::default();
        config.database.path = Some(PathBuf::from("/tmp/ledger.db"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/ledger.db"));
    }
}
