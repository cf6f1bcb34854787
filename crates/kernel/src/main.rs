//! Teahouse
//!
//! Tea catalog HTTP server and CSV export tool.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use teahouse_kernel::cli::{self, Cli, Command};
use teahouse_kernel::config::Config;
use teahouse_kernel::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::ExportCsv {
            search,
            category,
            output,
        } => {
            cli::cmd_export_csv(
                &config,
                search.as_deref(),
                category.as_deref(),
                output.as_deref(),
            )
            .await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, "Starting teahouse");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let app = teahouse_kernel::app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    // Logs go to stderr so `export-csv` can stream CSV on stdout.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
