// src/main.rs

use std::{net::SocketAddr, sync::Arc, time::Duration};

use dotenvy::dotenv;
use exam_portal::{
    config::{Config, STORE_PROBE_INTERVAL_SECS},
    routes,
    state::AppState,
    storage::{FallbackStore, JsonFileStore, PgStore},
    utils::hash::AdminCredentials,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let local = JsonFileStore::open(&config.data_dir).await?;
    let primary = connect_primary(&config).await;
    let store = Arc::new(FallbackStore::new(primary, local));

    if store.has_primary() {
        let probe_store = store.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(STORE_PROBE_INTERVAL_SECS));
            loop {
                interval.tick().await;
                probe_store.probe().await;
            }
        });
    } else {
        tracing::warn!(
            "Using local JSON storage in {}",
            config.data_dir.display()
        );
    }

    let admin = AdminCredentials::new(config.admin_username.clone(), &config.admin_password)?;
    tracing::info!("Admin account: {}", admin.username());

    let state = AppState {
        store,
        config: config.clone(),
        admin: Arc::new(admin),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

/// Connects to Postgres with retry and applies migrations.
/// Any failure leaves the server on local JSON storage.
async fn connect_primary(config: &Config) -> Option<PgStore> {
    let database_url = config.database_url.as_deref()?;

    let mut retry_count = 0;
    let store = loop {
        match PgStore::connect(database_url).await {
            Ok(store) => break store,
            Err(e) => {
                retry_count += 1;
                if retry_count >= 5 {
                    tracing::error!("Postgres connection failed after 5 attempts: {}", e);
                    tracing::warn!("Falling back to local JSON storage.");
                    return None;
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    if let Err(e) = store.migrate().await {
        tracing::error!("Failed to run database migrations: {}", e);
        tracing::warn!("Falling back to local JSON storage.");
        return None;
    }
    tracing::info!("Migrations applied successfully.");

    Some(store)
}
