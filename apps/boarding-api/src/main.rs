use boarding_api::{AppState, config::Config, create_app};
use boarding_core::{
    Cache, Clock,
    adapters::{
        InMemoryCache, PostgresIdentityProvider, PostgresTenantStore, RedisCache, SystemClock,
    },
    domain::room::RoomCatalog,
};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// main.rs only holds process setup; routing and handlers live in lib.rs.

fn init_tracing(default_level: &str) {
    // RUST_LOG wins over LOG_LEVEL when both are set
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

async fn build_state(config: &Config) -> Result<AppState, BoxError> {
    let rooms = RoomCatalog::new(config.room_labels.clone())?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut state = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await?;
            info!("Connected to Postgres, applying migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Migrations applied successfully.");

            let mut state = AppState::in_memory(rooms, clock, config.session_ttl_seconds);
            state.tenant_store = Arc::new(PostgresTenantStore::new(pool.clone()));
            state.identity = Arc::new(PostgresIdentityProvider::new(pool));
            state
        }
        None => {
            warn!("DATABASE_URL not set; tenants and accounts are kept in memory");
            AppState::in_memory(rooms, clock, config.session_ttl_seconds)
        }
    };

    let sessions: Arc<dyn Cache> = match &config.redis_url {
        Some(url) => Arc::new(RedisCache::connect(url, config.session_ttl_seconds).await?),
        None => {
            warn!("REDIS_URL not set; sessions are kept in memory");
            Arc::new(InMemoryCache::new(10_000, config.session_ttl_seconds))
        }
    };
    state.sessions = sessions;
    Ok(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

async fn run(config: Config) -> Result<(), BoxError> {
    let state = build_state(&config).await?;
    info!(rooms = state.rooms.len(), "Room catalog loaded");

    let app = create_app(state);
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("BoardingMate API listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment (.env) if present
    dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing("info");
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    init_tracing(&config.log_level);
    info!("Starting BoardingMate API v{}...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
