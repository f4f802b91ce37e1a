use anyhow::{Context, Result};
use codevault_db::{create_pool, run_migrations};
use codevault_server::config::{load_config, ServerConfig};
use codevault_server::state::AppState;
use codevault_server::web::build_router;

const DEFAULT_CONFIG_PATH: &str = "server-config.yaml";

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn read_config() -> Result<ServerConfig> {
    let path =
        std::env::var("CODEVAULT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    tracing::info!(path = %path, "Reading configuration");

    let config = load_config(&path)?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = read_config()?;

    let pool = create_pool(&config.db.url, config.db.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    run_migrations(&pool)
        .await
        .context("Failed to apply migrations")?;
    tracing::info!("Database ready");

    let app = build_router(AppState::new(pool, &config));

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen))?;
    tracing::info!("codevault listening on {}", config.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("codevault stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown requested, draining connections");
}
