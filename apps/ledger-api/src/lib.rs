//! # Shiftbook Ledger API
//!
//! HTTP service for one register: opens and closes shifts, takes payment for
//! orders, and reconciles the cash drawer.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Ledger API                                      │
//! │                                                                         │
//! │  Console ──► axum Router ──► Operator (JWT) ──► handlers               │
//! │                                                   │        │            │
//! │                                      writes       │        │ reads      │
//! │                                                   ▼        ▼            │
//! │                                          RegisterHandle   Database      │
//! │                                                   │        ▲            │
//! │                                                   ▼        │            │
//! │                                           RegisterActor ───┘            │
//! │                                           (ShiftLedger)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]: a TOML file plus `SHIFTBOOK_*` environment overrides.

pub mod auth;
pub mod config;
pub mod error;
pub mod register;
pub mod routes;

use shiftbook_db::Database;

pub use auth::{JwtManager, Operator};
pub use config::LedgerConfig;
pub use error::{ApiError, ApiResult};
pub use register::{RegisterError, RegisterHandle};
pub use routes::router;

/// Shared application state.
pub struct AppState {
    pub register: RegisterHandle,
    pub db: Database,
    pub jwt: JwtManager,
    pub config: LedgerConfig,
}

impl AppState {
    /// Restores the register from `db` and assembles the state.
    pub async fn new(db: Database, config: LedgerConfig) -> Result<Self, RegisterError> {
        let register = RegisterHandle::spawn(db.clone(), config.register.id.clone()).await?;
        let jwt = JwtManager::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_lifetime_secs,
        );

        Ok(AppState {
            register,
            db,
            jwt,
            config,
        })
    }
}
