//! In-process product store.
//!
//! Used when no `DATABASE_URL` is configured and by the test suite. Matching
//! follows the PostgreSQL backend: case-insensitive name substring, exact
//! category, `id` as the final tiebreaker. Text columns sort case-insensitively
//! with byte order breaking ties, which approximates a locale collation; exact
//! agreement with the database's collation is not guaranteed.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{ProductStore, StoreError};
use crate::catalog::{Page, PageRequest, ProductQuery, Sort, SortDirection, SortField};
use crate::models::{Product, ProductInput};

/// Product store backed by a map in memory.
#[derive(Default)]
pub struct MemoryProductStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    products: BTreeMap<i64, Product>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored products.
    pub fn len(&self) -> usize {
        self.inner.read().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, query: &ProductQuery, sort: Option<Sort>) -> Vec<Product> {
        // BTreeMap iteration is already id-ascending.
        let mut products: Vec<Product> = self
            .inner
            .read()
            .products
            .values()
            .filter(|p| matches_query(query, p))
            .cloned()
            .collect();
        if let Some(sort) = sort {
            products.sort_by(|a, b| compare(a, b, sort));
        }
        products
    }
}

fn matches_query(query: &ProductQuery, product: &Product) -> bool {
    match query {
        ProductQuery::All => true,
        ProductQuery::NameContains(term) => name_contains(product, term),
        ProductQuery::Category(category) => product.tea_type == *category,
        ProductQuery::NameAndCategory { term, category } => {
            product.tea_type == *category && name_contains(product, term)
        }
    }
}

fn name_contains(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(&term.to_lowercase())
}

fn text_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare(a: &Product, b: &Product, sort: Sort) -> Ordering {
    let ordering = match sort.field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Name => text_cmp(&a.name, &b.name),
        SortField::TeaType => text_cmp(&a.tea_type, &b.tea_type),
        SortField::Origin => text_cmp(&a.origin, &b.origin),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::StockQuantity => a.stock_quantity.cmp(&b.stock_quantity),
        SortField::ReceivedDate => a.received_date.cmp(&b.received_date),
    };
    let ordering = match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    };
    ordering.then(a.id.cmp(&b.id))
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find_all(
        &self,
        query: &ProductQuery,
        sort: Option<Sort>,
    ) -> Result<Vec<Product>, StoreError> {
        Ok(self.select(query, sort))
    }

    async fn find_page(
        &self,
        query: &ProductQuery,
        request: &PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let matching = self.select(query, Some(request.sort));
        let total = matching.len() as u64;
        let content = matching
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(request.size).unwrap_or(usize::MAX))
            .collect();
        Ok(Page::new(content, request, total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().products.get(&id).cloned())
    }

    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError> {
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let product = Product::from_input(inner.last_id, input.clone());
        inner.products.insert(product.id, product.clone());
        debug!(product_id = product.id, "product stored in memory");
        Ok(product)
    }

    async fn update(&self, id: i64, input: &ProductInput) -> Result<Product, StoreError> {
        let mut inner = self.inner.write();
        let Some(slot) = inner.products.get_mut(&id) else {
            return Err(StoreError::NotFound(id));
        };
        *slot = Product::from_input(id, input.clone());
        Ok(slot.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.inner
            .write()
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
