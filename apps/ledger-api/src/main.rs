//! # Ledger API Server
//!
//! ```text
//! ledger-api [--config <path>]                    serve HTTP
//! ledger-api [--config <path>] issue-token <op>   print a bearer token
//! ```
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ledger API Server                                │
//! │                                                                         │
//! │  Console ───► HTTP (8080) ───► Register actor ───► SQLite              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use shiftbook_api::{router, AppState, JwtManager, LedgerConfig};
use shiftbook_db::{Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

enum Mode {
    Serve,
    IssueToken(String),
}

struct Args {
    config: Option<PathBuf>,
    mode: Mode,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config = None;
    let mut mode = Mode::Serve;
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a path")?;
                config = Some(PathBuf::from(path));
            }
            "issue-token" => {
                let operator = args.next().context("issue-token needs an operator id")?;
                mode = Mode::IssueToken(operator);
            }
            other => bail!("Unknown argument: {other}"),
        }
    }

    Ok(Args { config, mode })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = parse_args()?;
    let config = LedgerConfig::load(args.config).context("Failed to load configuration")?;

    if let Mode::IssueToken(operator) = args.mode {
        let jwt = JwtManager::new(config.auth.jwt_secret.clone(), config.auth.token_lifetime_secs);
        println!("{}", jwt.issue(&operator)?);
        return Ok(());
    }

    info!(
        register_id = %config.register.id,
        register_name = %config.register.name,
        bind = %config.server.bind_address(),
        "Starting Shiftbook ledger API"
    );

    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let db = Database::new(DbConfig::new(&db_path).max_connections(config.database.max_connections))
        .await
        .context("Failed to open database")?;
    info!(path = %db_path.display(), "Database ready");

    let bind_address = config.server.bind_address();
    let state = Arc::new(AppState::new(db.clone(), config).await?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!(addr = %bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
