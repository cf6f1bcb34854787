//! Product store backends.
//!
//! Provides the store trait the catalog service queries through, with a
//! PostgreSQL backend and an in-process backend for development and tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{Page, PageRequest, ProductQuery, Sort};
use crate::config::Config;
use crate::db;
use crate::models::{Product, ProductInput};

pub use memory::MemoryProductStore;
pub use postgres::{PgProductStore, ProductQueryBuilder};

/// Store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(i64),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Product store trait.
///
/// Every ordering the store applies ends with `id` ascending, so equal sort
/// keys still page deterministically.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products matching the query, in `sort` order or id order when None.
    async fn find_all(
        &self,
        query: &ProductQuery,
        sort: Option<Sort>,
    ) -> Result<Vec<Product>, StoreError>;

    /// One page of products matching the query.
    async fn find_page(
        &self,
        query: &ProductQuery,
        request: &PageRequest,
    ) -> Result<Page<Product>, StoreError>;

    /// Find a product by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Insert a product; the store assigns the id.
    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError>;

    /// Overwrite every field of an existing product.
    ///
    /// Returns [`StoreError::NotFound`] if no product has this id.
    async fn update(&self, id: i64, input: &ProductInput) -> Result<Product, StoreError>;

    /// Delete a product.
    ///
    /// Returns [`StoreError::NotFound`] if no product has this id.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Check if the backend is reachable.
    async fn healthy(&self) -> bool;

    /// Backend name for logs and health output (e.g., "postgres", "memory").
    fn backend(&self) -> &'static str;
}

/// Open the store the configuration asks for.
///
/// With a `DATABASE_URL` this connects to PostgreSQL and applies migrations;
/// without one, products are kept in memory and lost on exit.
pub async fn connect(config: &Config) -> anyhow::Result<Arc<dyn ProductStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set; products are kept in memory only");
        return Ok(Arc::new(MemoryProductStore::new()));
    };

    let pool = db::create_pool(database_url, config.database_max_connections)
        .await
        .context("failed to create database pool")?;
    db::run_migrations(&pool).await?;
    info!(
        max_connections = config.database_max_connections,
        "PostgreSQL product store ready"
    );

    Ok(Arc::new(PgProductStore::new(pool)))
}
