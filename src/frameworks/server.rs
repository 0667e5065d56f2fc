// Framework bootstrap for the store back-office API.

use crate::domain::{CatalogStore, SessionStore, UserStore};
use crate::frameworks::config::{self, AppConfig};
use crate::frameworks::db::{connect_pool, run_migrations};
use crate::interface_adapters::classifier::ErrorClassifier;
use crate::interface_adapters::envelope::EnvelopeBuilder;
use crate::interface_adapters::routes::app;
use crate::interface_adapters::state::{AppState, InMemorySessionStore, SystemClock};
use crate::interface_adapters::stores::{
    InMemoryCatalogStore, InMemoryUserStore, PostgresCatalogStore, PostgresUserStore,
};
use crate::use_cases::login::PruneSessionsUseCase;
use crate::use_cases::users::SeedAdminUseCase;

use std::io::{self, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

// Periodically drops expired sessions so abandoned tokens do not pile up.
fn spawn_session_sweeper(
    sessions: Arc<dyn SessionStore>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let prune = PruneSessionsUseCase {
                clock: SystemClock,
                store: sessions.as_ref(),
            };
            if let Err(e) = prune.execute().await {
                tracing::warn!(error = %e, "session sweep failed");
            }
        }
    })
}

pub async fn run(listener: tokio::net::TcpListener, state: AppState) -> Result<()> {
    let address = listener.local_addr()?;
    let app = app(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();
    let config = config::load()?;
    tracing::info!(environment = ?config.environment, "configuration loaded");

    let state = build_state(&config).await?;
    let address = SocketAddr::new(config.bind_addr, config.http_port);

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener, state).await
}

/// Wires stores and response builders for the configured environment.
///
/// Uses PostgreSQL when a database URL is configured and in-memory stores
/// otherwise. Seeds the administrator account when a password is set.
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let (catalog, users): (Arc<dyn CatalogStore>, Arc<dyn UserStore>) =
        match config.database_url.as_deref() {
            Some(database_url) => {
                let db = connect_pool(database_url).await.map_err(|e| {
                    tracing::error!(error = %e, "failed to connect to database");
                    io::Error::other(e)
                })?;
                run_migrations(&db).await.map_err(|e| {
                    tracing::error!(error = %e, "failed to run migrations");
                    io::Error::other(e)
                })?;
                tracing::info!("using postgres stores");
                (
                    Arc::new(PostgresCatalogStore { db: db.clone() }),
                    Arc::new(PostgresUserStore { db }),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set, data will not survive a restart");
                (
                    Arc::new(InMemoryCatalogStore::new()),
                    Arc::new(InMemoryUserStore::new()),
                )
            }
        };

    if let Some(password) = config.admin_password.as_deref() {
        let seeded = SeedAdminUseCase {
            store: users.as_ref(),
        }
        .execute(&config.admin_username, &config.admin_email, password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to seed admin user");
            io::Error::other(e)
        })?;
        if seeded {
            tracing::info!(username = %config.admin_username, "admin user created");
        }
    }

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    spawn_session_sweeper(sessions.clone(), SESSION_SWEEP_INTERVAL);

    Ok(AppState {
        catalog,
        users,
        sessions,
        envelopes: EnvelopeBuilder::new(config.environment),
        classifier: ErrorClassifier::new(config.environment),
        session_ttl_seconds: config.session_ttl_seconds,
    })
}
