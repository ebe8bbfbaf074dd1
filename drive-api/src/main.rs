use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use drive_api::{app, state::{AppState, AuthConfig}, worker};
use drive_core::{SessionStore, SystemClock};
use drive_store::{BackendClient, Config, MemorySessionStore, RedisClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drive_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting DriveEasy gateway on port {}", config.server.port);

    let backend = BackendClient::new(&config.backend.base_url, config.backend.timeout_seconds)?;
    tracing::info!("Backend: {}", backend.base_url());

    let sessions: Arc<dyn SessionStore> = match &config.redis.url {
        Some(url) => {
            let redis = RedisClient::new(url).await?;
            redis.ping().await?;
            tracing::info!("Session store: redis");
            Arc::new(redis)
        }
        None => {
            tracing::warn!("No redis.url configured; session state is kept in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let app_state = AppState::new(
        Arc::new(backend),
        sessions,
        Arc::new(SystemClock),
        AuthConfig {
            hold_token_secret: config.auth.hold_token_secret.clone(),
        },
        config.business_rules.clone(),
    );

    tokio::spawn(worker::start_hold_sweeper(
        app_state.clone(),
        Duration::from_secs(config.business_rules.sweep_interval_seconds.max(1)),
    ));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
