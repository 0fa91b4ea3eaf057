use anyhow::Context;
use coursehub::bootstrap;
use coursehub::config::Config;
use coursehub::infrastructure::http::router::build_router;
use coursehub::infrastructure::observability;
use coursehub::infrastructure::persistence::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let _guard = observability::init(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize observability: {}", e))?;
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection established");

    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations applied");

    bootstrap::initialize_admin(&db, &config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize admin user: {}", e))?;

    let state = bootstrap::build_app_state(db, &config)
        .map_err(|e| anyhow::anyhow!("Failed to build application state: {}", e))?;

    let app = build_router(state);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
