//! HTTP server: registration, login, refresh rotation and CSRF issue.
//!
//! Environment:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `JWT_SECRET_KEY` | required, at least 32 bytes |
//! | `CSRF_TOKEN` | required |
//! | `DATABASE_URL` | `sqlite::memory:` |
//! | `PORT` | `8080` |
//! | `RUST_LOG` | `gatehouse=info,tower_http=info` |

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use gatehouse::api::axum::{AppState, router};
use gatehouse::crypto::Argon2Hasher;
use gatehouse::csrf::{CsrfGuard, CsrfService};
use gatehouse::jwt::{JwtConfig, JwtService};
use gatehouse::sqlite::{create_repositories, migrations};
use gatehouse::{GatehouseConfig, SecretString};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct ServerConfig {
    jwt_secret: SecretString,
    csrf_secret: SecretString,
    database_url: String,
    port: u16,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("csrf_secret", &"[REDACTED]")
            .field("database_url", &self.database_url)
            .field("port", &self.port)
            .finish()
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET_KEY").context("JWT_SECRET_KEY is not set")?;
        let csrf_secret = std::env::var("CSRF_TOKEN").context("CSRF_TOKEN is not set")?;
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_owned());
        let port = match std::env::var("PORT") {
            Ok(port) => port.parse().with_context(|| format!("invalid PORT: {port}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            jwt_secret: SecretString::new(jwt_secret),
            csrf_secret: SecretString::new(csrf_secret),
            database_url,
            port,
        })
    }
}

/// Logs how the wait for Ctrl-C ended. Returns `false` when the signal
/// handler could not be installed.
fn report_shutdown(signal: std::io::Result<()>) -> bool {
    match signal {
        Ok(()) => {
            tracing::info!("shutting down");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for shutdown signal, shutting down");
            false
        }
    }
}

async fn shutdown_signal() {
    report_shutdown(tokio::signal::ctrl_c().await);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatehouse=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(?config, "starting gatehouse");

    let options: SqliteConnectOptions = config
        .database_url
        .parse()
        .with_context(|| format!("invalid DATABASE_URL: {}", config.database_url))?;
    let in_memory = config.database_url.contains(":memory:");
    let mut pool_options = SqlitePoolOptions::new().max_connections(8);
    if in_memory {
        // each connection to an in-memory database is its own database
        pool_options = pool_options
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool_options
        .connect_with(options.create_if_missing(true).foreign_keys(true))
        .await
        .context("failed to open database")?;

    migrations::run(&pool).await.context("failed to run migrations")?;

    let (user_repo, refresh_repo) = create_repositories(pool);
    let signer = JwtService::new(JwtConfig::new(config.jwt_secret.expose_secret())?);
    let csrf = CsrfGuard::new(CsrfService::new(config.csrf_secret.expose_secret())?);

    let state = AppState::new(user_repo, refresh_repo, signer, csrf)
        .with_config(GatehouseConfig::default())
        .with_hasher(Arc::new(Argon2Hasher::production()));

    let app = router(state);
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;

    tracing::info!("listening on 0.0.0.0:{}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}
