//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::store::{self, MemoryProductStore, ProductStore};
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Catalog query and CRUD service.
    catalog: CatalogService,

    /// Theme engine for rendering.
    theme: Arc<ThemeEngine>,

    /// Category suggestions for the listing filter and form.
    categories: Vec<String>,

    /// Origin suggestions for the form.
    origins: Vec<String>,
}

impl AppState {
    /// Create new application state from configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = store::connect(config).await?;
        info!(backend = store.backend(), "product store connected");

        let theme = match &config.templates_dir {
            Some(dir) => {
                let theme = ThemeEngine::new(dir).context("failed to load templates")?;
                info!(path = %dir.display(), "templates loaded from directory");
                theme
            }
            None => ThemeEngine::builtin()?,
        };

        Ok(Self::from_parts(
            store,
            Arc::new(theme),
            config.categories.clone(),
            config.origins.clone(),
        ))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        store: Arc<dyn ProductStore>,
        theme: Arc<ThemeEngine>,
        categories: Vec<String>,
        origins: Vec<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(store),
                theme,
                categories,
                origins,
            }),
        }
    }

    /// State over an empty in-memory store with built-in templates and the
    /// default suggestion lists.
    pub fn in_memory() -> Result<Self> {
        let config = Config::in_memory();
        Ok(Self::from_parts(
            Arc::new(MemoryProductStore::new()),
            Arc::new(ThemeEngine::builtin()?),
            config.categories,
            config.origins,
        ))
    }

    /// Get the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the theme engine.
    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    pub fn categories(&self) -> &[String] {
        &self.inner.categories
    }

    pub fn origins(&self) -> &[String] {
        &self.inner.origins
    }

    /// Check if the product store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.catalog.store().healthy().await
    }
}
