//! Helpdesk server binary.
//!
//! Connects to PostgreSQL (or starts a locally managed instance with
//! `--local-db`), runs migrations, and serves the chat and user surfaces.

use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use helpdesk_api::{AppState, config::ApiConfig};
use helpdesk_core::db::LocalDb;

/// Support-chat backend server.
#[derive(Debug, Parser)]
#[command(name = "helpdesk_server", version, about)]
struct Cli {
    /// Address to bind the HTTP listener.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3200")]
    bind_addr: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/helpdesk"
    )]
    database_url: String,

    /// Run a locally managed PostgreSQL instance instead of connecting to an
    /// external one. Data lives under the platform data directory.
    #[arg(long)]
    local_db: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut local_db = None;
    let database_url = if cli.local_db {
        let mut db = LocalDb::with_default_data_dir().await?;
        db.setup().await?;
        db.start().await?;
        let url = db.connection_url();
        local_db = Some(db);
        url
    } else {
        cli.database_url
    };

    let config = ApiConfig {
        bind_addr: cli.bind_addr,
        pg_connection_url: database_url,
    };

    let pool = PgPoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.pg_connection_url)
        .await?;

    helpdesk_api::migrate(&pool).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);

    let state = AppState { pool, config };
    axum::serve(listener, helpdesk_api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(mut db) = local_db {
        db.stop().await?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
    }
}
