use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use omm_api::{app, state::{AppState, AuthConfig}};
use omm_booking::WizardDeps;
use omm_core::{SystemClock, TracingNotifier};
use omm_store::{DbClient, PgBookingRepository, PgProfileRepository, PgTripRepository, RedisProgressStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omm_api=debug,omm_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = omm_store::app_config::Config::load().context("Failed to load config")?;
    tracing::info!("Starting One More Mile API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    // Redis (saved booking progress)
    let progress_store = RedisProgressStore::connect(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;

    let deps = WizardDeps {
        trips: Arc::new(PgTripRepository::new(db.pool.clone())),
        bookings: Arc::new(PgBookingRepository::new(db.pool.clone())),
        profiles: Arc::new(PgProfileRepository::new(db.pool.clone())),
        store: Arc::new(progress_store),
        notifier: Arc::new(TracingNotifier),
        clock: Arc::new(SystemClock),
        settings: config.wizard.clone(),
    };

    let app_state = AppState::new(
        deps,
        AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    );

    app_state.sessions.spawn_sweeper(
        Duration::from_secs(config.server.session_idle_seconds),
        Duration::from_secs(config.server.session_sweep_seconds),
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
