//! Teahouse Kernel Library
//!
//! Tea catalog web application: product store, catalog query service and
//! server-rendered pages. The `teahouse` binary wraps this library.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod theme;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::AppState;

/// Build the application router with session and tracing layers.
pub fn app(state: AppState, config: &Config) -> Router {
    let session_layer = session::create_session_layer(
        session::parse_same_site(&config.cookie_same_site),
        config.cookie_secure,
    );

    // Layers run outermost-last: TraceLayer → session → routes
    routes::router()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
