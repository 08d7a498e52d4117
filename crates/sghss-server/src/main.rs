//! SGHSS API server binary.

use std::process::ExitCode;
use std::sync::Arc;

use sghss_auth::{AuthState, TokenService};
use sghss_db::{create_pool, ensure_schema};
use sghss_server::{AppState, build_router, load_config, observability};

/// Where the config file path came from, for the startup log line.
enum ConfigSource {
    CliFlag(String),
    Environment(String),
    Default,
}

impl ConfigSource {
    fn resolve() -> Self {
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            if arg == "--config" {
                if let Some(path) = args.next() {
                    return Self::CliFlag(path);
                }
            } else if let Some(path) = arg.strip_prefix("--config=") {
                return Self::CliFlag(path.to_string());
            }
        }
        match std::env::var("SGHSS_CONFIG") {
            Ok(path) if !path.is_empty() => Self::Environment(path),
            _ => Self::Default,
        }
    }

    fn path(&self) -> &str {
        match self {
            Self::CliFlag(p) | Self::Environment(p) => p,
            Self::Default => "sghss.toml",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let source = ConfigSource::resolve();
    let cfg = match load_config(Some(source.path())) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::from(2);
        }
    };
    if let Err(e) = cfg.validate() {
        eprintln!("invalid configuration: {e}");
        return ExitCode::from(2);
    }

    observability::init_tracing(&cfg.logging.level);

    tracing::info!(
        config = source.path(),
        version = env!("CARGO_PKG_VERSION"),
        "Starting SGHSS API"
    );

    let pool = match create_pool(&cfg.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = ensure_schema(&pool).await {
        tracing::error!(error = %e, "Failed to prepare database schema");
        return ExitCode::FAILURE;
    }

    let auth = AuthState::new(Arc::new(TokenService::new(&cfg.auth.jwt_secret)));
    let app = build_router(AppState { pool, auth });

    let addr = cfg.addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind listener");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%addr, "Listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = served {
        tracing::error!(error = %e, "Server terminated with an error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
