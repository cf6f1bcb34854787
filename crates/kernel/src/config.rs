//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default category suggestions offered on the listing filter and product form.
pub const DEFAULT_CATEGORIES: &[&str] = &["Green", "Black", "Oolong", "White", "Pu-erh"];

/// Default origin suggestions offered on the product form.
pub const DEFAULT_ORIGINS: &[&str] = &["China", "Japan", "India", "Sri Lanka", "Taiwan"];

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. When None, products live in memory.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Directory overriding the built-in templates.
    pub templates_dir: Option<PathBuf>,

    /// Category (tea type) suggestions, comma-separated in `CATALOG_CATEGORIES`.
    pub categories: Vec<String>,

    /// Origin suggestions, comma-separated in `CATALOG_ORIGINS`.
    pub origins: Vec<String>,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "lax").
    pub cookie_same_site: String,

    /// Only send the session cookie over HTTPS (default: false).
    pub cookie_secure: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let templates_dir = env::var("TEMPLATES_DIR").ok().map(PathBuf::from);

        let categories = env::var("CATALOG_CATEGORIES")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| to_owned_list(DEFAULT_CATEGORIES));

        let origins = env::var("CATALOG_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_else(|_| to_owned_list(DEFAULT_ORIGINS));

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "lax".to_string())
            .to_lowercase();

        let cookie_secure = env::var("COOKIE_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            templates_dir,
            categories,
            origins,
            cookie_same_site,
            cookie_secure,
        })
    }

    /// Configuration for an in-memory catalog with built-in templates.
    pub fn in_memory() -> Self {
        Self {
            port: 3000,
            database_url: None,
            database_max_connections: 10,
            templates_dir: None,
            categories: to_owned_list(DEFAULT_CATEGORIES),
            origins: to_owned_list(DEFAULT_ORIGINS),
            cookie_same_site: "lax".to_string(),
            cookie_secure: false,
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
