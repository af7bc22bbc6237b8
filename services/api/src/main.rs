use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api::{
    AppState,
    config::{ApiConfig, StorageBackend},
    repositories::Stores,
    routes,
};
use common::{
    cache::{RedisConfig, RedisPool, RevocationList},
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn open_storage(config: &ApiConfig) -> Result<(Stores, RevocationList)> {
    match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }
            run_migrations(&pool).await?;

            let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }

            Ok((Stores::postgres(pool), RevocationList::Redis(redis_pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; all data is lost on shutdown");
            Ok((Stores::in_memory(), RevocationList::in_memory()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    info!("Starting shop floor API service");

    let config = ApiConfig::load()?;
    let (stores, revocations) = open_storage(&config).await?;

    let app_state = AppState::new(stores, &config, revocations);
    app_state
        .directory
        .bootstrap_admin(config.bootstrap_admin.as_ref())
        .await?;
    info!(
        "Order progress policy: {:?}",
        app_state.orders.policy()
    );

    let app = routes::create_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(routes::cors_layer());

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("API service listening on {}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
