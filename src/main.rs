use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nelloriens_api::config::StoreBackend;
use nelloriens_api::{build_router, store, AppConfig, AppState};

#[derive(Parser, Debug)]
#[command(name = "nelloriens-api", version, about = "Listings API for the Nelloriens regional portal")]
struct Args {
    /// Port to listen on (overrides PORT / API_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Document store backend: memory or firestore (overrides STORE_BACKEND)
    #[arg(long, value_parser = parse_backend)]
    store: Option<StoreBackend>,
}

fn parse_backend(value: &str) -> Result<StoreBackend, String> {
    StoreBackend::parse(value).ok_or_else(|| format!("unknown store backend '{}'", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up FIRESTORE_PROJECT_ID, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nelloriens_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(backend) = args.store {
        config.store.backend = backend;
    }
    tracing::info!("Starting Nelloriens API in {:?} mode", config.environment);

    let store = store::connect(&config.store).context("failed to configure document store")?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_router(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Nelloriens API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
