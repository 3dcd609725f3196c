use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use storefront_api::auth::PasswordHashing;
use storefront_api::config;
use storefront_api::database::{seed, DatabaseManager, InMemoryStore, PgStore, Store};
use storefront_api::router;
use storefront_api::state::AppState;

#[derive(Parser)]
#[command(name = "storefront-api")]
#[command(about = "JSON REST backend for the storefront")]
#[command(version)]
struct Args {
    #[arg(long, help = "Create default categories, sample products and the admin account")]
    seed: bool,

    #[arg(long, help = "Keep all data in memory instead of PostgreSQL")]
    in_memory: bool,

    #[arg(long, help = "Port to listen on; overrides PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    info!("Starting storefront API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if args.in_memory {
        info!("Using in-memory store");
        Arc::new(InMemoryStore::new())
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        let store = PgStore::new(pool);
        store.init_schema().await.context("failed to create schema")?;
        Arc::new(store)
    };

    let passwords = PasswordHashing::default();
    if args.seed {
        seed::seed(store.as_ref(), &passwords, &config.seed)
            .await
            .context("seeding failed")?;
    }

    let state = AppState::new(store, &config.security, passwords);
    let mut app = router::app(state);
    if let Some(cors) = router::cors_layer(&config.security) {
        app = app.layer(cors);
    }

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Storefront API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
