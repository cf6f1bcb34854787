//! PostgreSQL product store.
//!
//! Filtered listings are generated with SeaQuery from a [`ProductQuery`];
//! single-row writes use plain parameterized statements.

use async_trait::async_trait;
use sea_query::{Asterisk, Expr, Func, Iden, Order, PostgresQueryBuilder, Query, SelectStatement};
use sqlx::PgPool;
use tracing::debug;

use super::{ProductStore, StoreError};
use crate::catalog::{Page, PageRequest, ProductQuery, Sort, SortDirection, SortField};
use crate::db;
use crate::models::{Product, ProductInput};

/// Product table and columns.
#[derive(Iden, Clone, Copy)]
enum ProductIden {
    #[iden = "product"]
    Table,
    Id,
    Name,
    TeaType,
    Origin,
    Price,
    StockQuantity,
    Description,
    ReceivedDate,
}

const ALL_COLUMNS: [ProductIden; 8] = [
    ProductIden::Id,
    ProductIden::Name,
    ProductIden::TeaType,
    ProductIden::Origin,
    ProductIden::Price,
    ProductIden::StockQuantity,
    ProductIden::Description,
    ProductIden::ReceivedDate,
];

const RETURNING: &str =
    "id, name, tea_type, origin, price, stock_quantity, description, received_date";

fn sort_column(field: SortField) -> ProductIden {
    match field {
        SortField::Id => ProductIden::Id,
        SortField::Name => ProductIden::Name,
        SortField::TeaType => ProductIden::TeaType,
        SortField::Origin => ProductIden::Origin,
        SortField::Price => ProductIden::Price,
        SortField::StockQuantity => ProductIden::StockQuantity,
        SortField::ReceivedDate => ProductIden::ReceivedDate,
    }
}

/// SQL builder for product listings.
pub struct ProductQueryBuilder<'a> {
    query: &'a ProductQuery,
}

impl<'a> ProductQueryBuilder<'a> {
    pub fn new(query: &'a ProductQuery) -> Self {
        Self { query }
    }

    /// Build the SELECT for every matching row, ordered by `sort` then id.
    pub fn build(&self, sort: Option<Sort>) -> String {
        let mut select = self.base_select();
        Self::add_sort(&mut select, sort);
        select.to_string(PostgresQueryBuilder)
    }

    /// Build the SELECT for one page.
    pub fn build_page(&self, request: &PageRequest) -> String {
        let mut select = self.base_select();
        Self::add_sort(&mut select, Some(request.sort));
        select.limit(request.size);
        select.offset(request.offset());
        select.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query for total results.
    pub fn build_count(&self) -> String {
        let mut select = Query::select();
        select.expr(Expr::col(Asterisk).count());
        select.from(ProductIden::Table);
        self.add_filters(&mut select);
        select.to_string(PostgresQueryBuilder)
    }

    fn base_select(&self) -> SelectStatement {
        let mut select = Query::select();
        select.columns(ALL_COLUMNS).from(ProductIden::Table);
        self.add_filters(&mut select);
        select
    }

    fn add_filters(&self, select: &mut SelectStatement) {
        if let Some(term) = self.query.term() {
            let pattern = format!("%{}%", escape_like_wildcards(&term.to_lowercase()));
            select.and_where(Expr::expr(Func::lower(Expr::col(ProductIden::Name))).like(pattern));
        }
        if let Some(category) = self.query.category() {
            select.and_where(Expr::col(ProductIden::TeaType).eq(category));
        }
    }

    fn add_sort(select: &mut SelectStatement, sort: Option<Sort>) {
        if let Some(sort) = sort {
            let order = match sort.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            select.order_by(sort_column(sort.field), order);
        }
        select.order_by(ProductIden::Id, Order::Asc);
    }
}

/// Escape LIKE wildcards in user input.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Product store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn find_all(
        &self,
        query: &ProductQuery,
        sort: Option<Sort>,
    ) -> Result<Vec<Product>, StoreError> {
        let sql = ProductQueryBuilder::new(query).build(sort);
        debug!(%sql, "listing products");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    async fn find_page(
        &self,
        query: &ProductQuery,
        request: &PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        let builder = ProductQueryBuilder::new(query);

        let count_sql = builder.build_count();
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&self.pool)
            .await?;

        let page_sql = builder.build_page(request);
        debug!(sql = %page_sql, "listing product page");
        let content = sqlx::query_as::<_, Product>(&page_sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(content, request, u64::try_from(total).unwrap_or(0)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {RETURNING} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO product (name, tea_type, origin, price, stock_quantity, description, received_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RETURNING}
            "#
        ))
        .bind(&input.name)
        .bind(&input.tea_type)
        .bind(&input.origin)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(&input.description)
        .bind(input.received_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(&self, id: i64, input: &ProductInput) -> Result<Product, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE product
            SET name = $2, tea_type = $3, origin = $4, price = $5,
                stock_quantity = $6, description = $7, received_date = $8
            WHERE id = $1
            RETURNING {RETURNING}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.tea_type)
        .bind(&input.origin)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(&input.description)
        .bind(input.received_date)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn healthy(&self) -> bool {
        db::check_health(&self.pool).await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
