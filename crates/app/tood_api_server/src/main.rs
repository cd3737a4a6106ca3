//! Tood API server binary.
//!
//! Reads configuration from the environment (and `.env`), picks a review
//! store, and serves the HTTP API until interrupted.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tood_api::config::ApiConfig;
use tood_core::reviews::ReviewStore;
use tood_core::reviews::memory::InMemoryReviewStore;
use tood_core::reviews::postgres::PgReviewStore;
use tracing::{info, warn};

/// How often expired revocation entries are dropped.
const REVOCATION_PRUNE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "tood_api_server", about = "Tood API server")]
struct Args {
    /// Address to listen on; overrides `BIND_ADDR`.
    #[arg(long)]
    bind: Option<String>,

    /// PostgreSQL connection URL. Reviews are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tood_api=debug,tood_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = args.database_url.filter(|u| !u.trim().is_empty()) {
        config.database_url = Some(url);
    }
    if config.google_client_id.is_empty() {
        warn!("GOOGLE_CLIENT_ID is not set; every login will be rejected");
    }

    info!(
        bind_addr = %config.bind_addr,
        backend_url = %config.backend_url,
        "starting tood_api_server"
    );

    let reviews: Arc<dyn ReviewStore> = match &config.database_url {
        Some(url) => {
            info!(max_connections = args.max_connections, "configuring connection pool");
            let pool = PgPoolOptions::new()
                .max_connections(args.max_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;

            info!("running database migrations");
            tood_core::migrate::migrate(&pool).await?;
            Arc::new(PgReviewStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; reviews are kept in memory and lost on restart");
            Arc::new(InMemoryReviewStore::new())
        }
    };

    let keys = Arc::new(tood_api::remote_key_source(&config)?);
    let state = tood_api::AppState::new(config.clone(), keys, reviews)?;
    state.sessions.spawn_prune_task(REVOCATION_PRUNE_INTERVAL);

    let app = tood_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutting down");
        })
        .await?;

    Ok(())
}
