//! Command-line interface.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::store;

/// Tea catalog server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Write the catalog as CSV, optionally filtered.
    ExportCsv {
        /// Only products whose name contains this text.
        #[arg(long)]
        search: Option<String>,

        /// Only products of this tea type ("All" for every type).
        #[arg(long)]
        category: Option<String>,

        /// Output file; stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Export matching products as CSV to `output` or stdout.
pub async fn cmd_export_csv(
    config: &Config,
    search: Option<&str>,
    category: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let catalog = CatalogService::new(store::connect(config).await?);
    let products = catalog
        .search_and_filter(search, category)
        .await
        .context("failed to load products")?;
    let csv = catalog.export_csv(&products);

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            file.write_all(&csv)?;
            info!(count = products.len(), path = %path.display(), "CSV export written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&csv)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
