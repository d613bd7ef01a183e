//! Store selection and service wiring.

use std::fmt;
use std::sync::Arc;

use stockroom_core::PageResolver;
use stockroom_infra::AppConfig;
use stockroom_infra::InventoryService;
use stockroom_infra::product_store::{
    InMemoryProductStore, PostgresProductStore, ProductStore, StoreError,
};

pub type SharedStore = Arc<dyn ProductStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::InMemory => f.write_str("in-memory"),
            StoreBackend::Postgres => f.write_str("postgres"),
        }
    }
}

/// Everything a handler needs, shared behind an `Arc`.
pub struct AppServices {
    pub inventory: InventoryService<SharedStore>,
    pub pages: PageResolver,
    pub backend: StoreBackend,
}

impl AppServices {
    pub fn new(store: SharedStore, pages: PageResolver, backend: StoreBackend) -> Self {
        Self {
            inventory: InventoryService::new(store),
            pages,
            backend,
        }
    }

    /// Fresh in-memory wiring (dev/test).
    pub fn in_memory(default_page_limit: i64) -> Self {
        Self::new(
            Arc::new(InMemoryProductStore::new()),
            PageResolver::new(default_page_limit),
            StoreBackend::InMemory,
        )
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let pages = PageResolver::new(config.default_page_limit);

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory product store (data is lost on exit)");
        return Ok(AppServices::new(
            Arc::new(InMemoryProductStore::new()),
            pages,
            StoreBackend::InMemory,
        ));
    };

    let store = PostgresProductStore::connect(database_url, config.max_connections).await?;
    store.migrate().await?;
    tracing::info!(max_connections = config.max_connections, "connected to postgres");

    Ok(AppServices::new(Arc::new(store), pages, StoreBackend::Postgres))
}
