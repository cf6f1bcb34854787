//! Catalog query module.
//!
//! This module provides:
//! - ProductQuery / Sort / PageRequest / Page: query vocabulary
//! - CatalogService: search, filter, pagination and CRUD over a product store
//! - export_csv: CSV rendering of a product sequence

pub mod csv;
pub mod query;
mod service;

use thiserror::Error;

use crate::models::ValidationErrors;
use crate::store::StoreError;

pub use csv::export_csv;
pub use query::{
    ALL_CATEGORIES, Page, PageRequest, ProductQuery, Sort, SortDirection, SortField,
};
pub use service::CatalogService;

/// Catalog operation failures.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("product {0} not found")]
    NotFound(i64),

    #[error("unknown sort field '{0}'")]
    InvalidSortField(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CatalogError::NotFound(id),
            other => CatalogError::Store(other),
        }
    }
}
