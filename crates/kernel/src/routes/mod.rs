//! HTTP route handlers.

pub mod health;
pub mod helpers;
pub mod product;

use axum::Router;

use crate::state::AppState;

/// Every route the application serves.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(product::router())
        .merge(health::router())
}
