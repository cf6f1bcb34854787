#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! This module provides test infrastructure that uses the REAL kernel code:
//! the full router, session layer and catalog service over an in-memory
//! product store. Each test builds its own [`TestApp`], so tests never share
//! catalog rows.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use teahouse_kernel::catalog::{Page, PageRequest, ProductQuery, Sort};
use teahouse_kernel::config::Config;
use teahouse_kernel::models::{Product, ProductInput};
use teahouse_kernel::state::AppState;
use teahouse_kernel::store::{ProductStore, StoreError};
use teahouse_kernel::theme::ThemeEngine;
use teahouse_test_utils::TestProduct;

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application over an empty in-memory catalog.
    pub fn new() -> Self {
        let state = AppState::in_memory().expect("Failed to initialize AppState");
        let router = teahouse_kernel::app(state.clone(), &Config::in_memory());
        Self { router, state }
    }

    /// Create a test application over a caller-supplied product store.
    pub fn with_store(store: Arc<dyn ProductStore>) -> Self {
        let config = Config::in_memory();
        let theme = ThemeEngine::builtin().expect("Failed to load built-in templates");
        let state = AppState::from_parts(
            store,
            Arc::new(theme),
            config.categories.clone(),
            config.origins.clone(),
        );
        let router = teahouse_kernel::app(state.clone(), &config);
        Self { router, state }
    }

    /// Create a test application whose store rejects every call.
    pub fn failing() -> Self {
        Self::with_store(Arc::new(FailingStore))
    }

    /// Insert fixtures through the catalog service, returning them with ids.
    pub async fn seed(&self, products: &[TestProduct]) -> Vec<Product> {
        let mut created = Vec::with_capacity(products.len());
        for product in products {
            let saved = self
                .state
                .catalog()
                .create(input_from(product))
                .await
                .expect("Failed to seed product");
            created.push(saved);
        }
        created
    }

    /// Every stored product in id order.
    pub async fn stored(&self) -> Vec<Product> {
        self.state.catalog().list_all().await.unwrap()
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// GET a path.
    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// GET a path carrying session cookies.
    pub async fn get_with_cookies(&self, uri: &str, cookies: &str) -> Response {
        self.request_with_cookies(Request::get(uri).body(Body::empty()).unwrap(), cookies)
            .await
    }

    /// POST an URL-encoded form body.
    pub async fn post_form(&self, uri: &str, body: String) -> Response {
        self.request(
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Follow a redirect to the listing and return the rendered page.
    ///
    /// The redirect's session cookie is replayed so the flash message shows.
    pub async fn follow_redirect(&self, response: &Response) -> String {
        assert_redirects_home(response);
        let cookies = extract_cookies(response);
        let page = self.get_with_cookies("/", &cookies).await;
        assert_eq!(page.status(), StatusCode::OK);
        body_string(page).await
    }
}

/// Product store that behaves like an unreachable database.
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ProductStore for FailingStore {
    async fn find_all(
        &self,
        _query: &ProductQuery,
        _sort: Option<Sort>,
    ) -> Result<Vec<Product>, StoreError> {
        Err(unavailable())
    }

    async fn find_page(
        &self,
        _query: &ProductQuery,
        _request: &PageRequest,
    ) -> Result<Page<Product>, StoreError> {
        Err(unavailable())
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<Product>, StoreError> {
        Err(unavailable())
    }

    async fn insert(&self, _input: &ProductInput) -> Result<Product, StoreError> {
        Err(unavailable())
    }

    async fn update(&self, _id: i64, _input: &ProductInput) -> Result<Product, StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _id: i64) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn healthy(&self) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Build a typed product input from a fixture.
pub fn input_from(product: &TestProduct) -> ProductInput {
    ProductInput {
        name: product.name.clone(),
        tea_type: product.tea_type.clone(),
        origin: product.origin.clone(),
        price: product.price,
        stock_quantity: product.stock_quantity,
        description: product.description.clone(),
        received_date: product.received_date,
    }
}

/// Assert the response is a See Other redirect to the listing.
pub fn assert_redirects_home(response: &Response) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/",
        "unexpected redirect target"
    );
}

/// Read a response body as UTF-8 text.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| {
            // Extract just the cookie name=value, ignoring attributes
            cookie.split(';').next()
        })
        .collect::<Vec<_>>()
        .join("; ")
}
