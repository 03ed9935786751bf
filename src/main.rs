use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use planets_api::auth::issue_token;
use planets_api::database::{MemoryPlanetStore, PgPlanetStore, PlanetStore};
use planets_api::{build_app, AppOptions, AppState};

#[derive(Parser)]
#[command(name = "planets-api")]
#[command(about = "Planets API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT / PLANETS_API_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Directory for uploaded photos (overrides UPLOADS_DIR)")]
    uploads_dir: Option<PathBuf>,

    #[arg(long, help = "Keep planets in memory instead of PostgreSQL")]
    memory: bool,

    #[arg(long, value_name = "SUBJECT", help = "Print a bearer token for SUBJECT and exit")]
    issue_token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("planets_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = planets_api::config::config();

    if let Some(subject) = args.issue_token {
        let ttl = chrono::Duration::hours(config.security.jwt_expiry_hours as i64);
        let token = issue_token(&subject, &config.security.jwt_secret, ttl)?;
        println!("{}", token);
        return Ok(());
    }

    tracing::info!("Starting Planets API in {:?} mode", config.environment);

    let options = AppOptions::from_config(config)?;

    let mut pg_store = None;
    let store: Arc<dyn PlanetStore> = if args.memory {
        tracing::warn!("Using in-memory planet store; data is lost on exit");
        Arc::new(MemoryPlanetStore::new())
    } else {
        let store = PgPlanetStore::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        store.ensure_table().await.context("failed to prepare planets table")?;
        pg_store = Some(store.clone());
        Arc::new(store)
    };

    let uploads_dir = args.uploads_dir.unwrap_or_else(|| config.server.uploads_dir.clone());
    let app = build_app(AppState::new(store, uploads_dir), &options);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Planets API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(store) = pg_store {
        store.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
