//! Theme engine and template rendering.
//!
//! Provides Tera-based rendering of the catalog pages, from built-in
//! templates or a `TEMPLATES_DIR` override.

mod engine;

pub use engine::ThemeEngine;
