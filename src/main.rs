use anyhow::Result;
use fitness_platform::api::create_routes;
use fitness_platform::config::{run_migrations, AppConfig, DatabaseConfig, StorageBackend};
use fitness_platform::repositories::Repositories;
use fitness_platform::state::AppState;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if config.is_production() && config.uses_default_jwt_secret() {
        warn!("JWT_SECRET is not set; tokens are signed with the development default");
    }

    let repositories = match config.storage {
        StorageBackend::Postgres => {
            let database = DatabaseConfig::from_env()?;
            let pool = database.create_pool().await?;
            run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on shutdown");
            Repositories::in_memory()
        }
    };

    let state = AppState::new(&config, repositories)?;
    let app = create_routes(state);

    let address = config.server_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Fitness platform starting on http://{} ({})", address, config.environment);
    info!("Health check available at http://{}/health", address);
    info!("GraphQL available at http://{}/graphql", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
