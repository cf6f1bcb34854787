//! Catalog query service.
//!
//! Resolves optional search/filter inputs into a [`ProductQuery`] and runs it
//! against the configured [`ProductStore`]. Writes are validated before the
//! store is touched.

use std::sync::Arc;

use tracing::{info, warn};

use super::query::{Page, PageRequest, ProductQuery, Sort};
use super::{CatalogError, csv};
use crate::models::{Product, ProductInput};
use crate::store::ProductStore;

/// Service for catalog queries and product CRUD.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductStore>,
}

impl CatalogService {
    /// Create a new catalog service over a store.
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Every product, in store order.
    pub async fn list_all(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.find_all(&ProductQuery::All, None).await?)
    }

    /// Every product, sorted.
    pub async fn list_sorted(&self, sort: Sort) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.find_all(&ProductQuery::All, Some(sort)).await?)
    }

    /// One page of every product.
    pub async fn list(&self, request: &PageRequest) -> Result<Page<Product>, CatalogError> {
        self.run_paged(ProductQuery::All, request).await
    }

    /// Products whose name contains `term`; everything when the term is blank.
    pub async fn search(&self, term: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        self.run(ProductQuery::select(term, None)).await
    }

    /// Paged counterpart of [`search`](Self::search).
    pub async fn search_paged(
        &self,
        term: Option<&str>,
        request: &PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        self.run_paged(ProductQuery::select(term, None), request).await
    }

    /// Products in `category`; everything when blank or "All".
    pub async fn filter(&self, category: Option<&str>) -> Result<Vec<Product>, CatalogError> {
        self.run(ProductQuery::select(None, category)).await
    }

    /// Paged counterpart of [`filter`](Self::filter).
    pub async fn filter_paged(
        &self,
        category: Option<&str>,
        request: &PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        self.run_paged(ProductQuery::select(None, category), request)
            .await
    }

    /// Combined search and category filter.
    ///
    /// Both present → conjunction; one present → that filter alone;
    /// neither → every product.
    pub async fn search_and_filter(
        &self,
        term: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<Product>, CatalogError> {
        self.run(ProductQuery::select(term, category)).await
    }

    /// Paged counterpart of [`search_and_filter`](Self::search_and_filter).
    pub async fn search_and_filter_paged(
        &self,
        term: Option<&str>,
        category: Option<&str>,
        request: &PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        self.run_paged(ProductQuery::select(term, category), request)
            .await
    }

    /// Find a product by id.
    pub async fn find(&self, id: i64) -> Result<Option<Product>, CatalogError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Validate and insert a new product.
    pub async fn create(&self, input: ProductInput) -> Result<Product, CatalogError> {
        input.validate()?;
        let product = self.store.insert(&input).await?;
        info!(product_id = product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// Validate and overwrite the product with `id`.
    ///
    /// The path id always wins; the input carries no id of its own.
    pub async fn update(&self, id: i64, input: ProductInput) -> Result<Product, CatalogError> {
        input.validate()?;
        let product = self.store.update(id, &input).await?;
        info!(product_id = id, "product updated");
        Ok(product)
    }

    /// Delete the product with `id`.
    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        if let Err(e) = self.store.delete(id).await {
            warn!(product_id = id, error = %e, "product delete failed");
            return Err(e.into());
        }
        info!(product_id = id, "product deleted");
        Ok(())
    }

    /// Render products as CSV bytes.
    pub fn export_csv(&self, products: &[Product]) -> Vec<u8> {
        csv::export_csv(products)
    }

    async fn run(&self, query: ProductQuery) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.find_all(&query, None).await?)
    }

    async fn run_paged(
        &self,
        query: ProductQuery,
        request: &PageRequest,
    ) -> Result<Page<Product>, CatalogError> {
        Ok(self.store.find_page(&query, request).await?)
    }
}
