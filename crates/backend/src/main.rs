use anyhow::{Context, Result};
use backend::{
    di::DependenciesInjectDeps, handler::AppRouter, repository::memory::InMemoryStore,
    state::AppState,
};
use shared::{
    config::{Config, ConnectionManager, ConnectionPool, StorageBackend},
    utils::{Telemetry, init_logger},
};
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "order-backend";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let is_dev = std::env::var("DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let is_enable_file = std::env::var("ENABLE_FILE_LOG")
        .map(|v| v == "true")
        .unwrap_or(false);

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = match config.otel_endpoint.as_deref() {
        Some(endpoint) => Some(
            Telemetry::init(SERVICE_NAME, endpoint).context("Failed to initialize telemetry")?,
        ),
        None => None,
    };

    let _log_guard = init_logger(
        SERVICE_NAME,
        is_dev,
        is_enable_file,
        telemetry.as_ref().map(Telemetry::logger_provider),
    );

    info!("🚀 Starting {SERVICE_NAME} with {:?} storage", config.storage);

    let deps = build_deps(&config)
        .await
        .context("Failed to initialize storage")?;

    let state = AppState::new(deps);

    let result = AppRouter::serve(config.port, state).await;
    if let Err(e) = &result {
        error!("❌ Server stopped with error: {e:?}");
    }

    if let Some(telemetry) = telemetry {
        if let Err(e) = telemetry.shutdown() {
            warn!("Failed to shutdown telemetry: {e}");
        }
    }

    info!("✅ {SERVICE_NAME} shutdown complete.");
    result
}

async fn build_deps(config: &Config) -> Result<DependenciesInjectDeps> {
    match config.storage {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for postgres storage")?;

            let pool =
                ConnectionManager::new_pool(database_url, config.db_min_conn, config.db_max_conn)
                    .await
                    .context("Failed to initialize database pool")?;

            if config.run_migrations {
                run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
            }

            Ok(DependenciesInjectDeps::postgres(pool, config.lock_timeout))
        }
        StorageBackend::Memory => {
            warn!("⚠️ Using in-memory storage; data is lost on shutdown");
            Ok(DependenciesInjectDeps::in_memory(InMemoryStore::new(
                config.lock_timeout,
            )))
        }
    }
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("✅ Database migrations applied");
    Ok(())
}
