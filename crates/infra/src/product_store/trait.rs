use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use stockroom_core::{PageRequest, ProductId};
use stockroom_products::{NewProduct, Product, ProductChanges};

/// Product store operation error.
///
/// These are **infrastructure errors** as opposed to domain errors (validation).
/// Constraint outcomes the service needs to tell apart (missing row, name
/// collision, not enough stock) get their own variants; everything else is
/// `Backend`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product not found")]
    NotFound,

    #[error("duplicate product name: {0}")]
    Duplicate(String),

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("stored row is invalid: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Persistence boundary for products.
///
/// All reads hide soft-deleted rows. Implementations must:
/// - assign ids from a monotonically increasing sequence and never reuse them
/// - enforce name uniqueness among live products atomically with the write
/// - perform `sell` as a single conditional decrement: the stock check and the
///   write must not be separable by a concurrent `sell`/`update` on the same id
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product and return it with its assigned id.
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Load a live product.
    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Live products, newest (highest id) first, windowed by `page`.
    async fn list(&self, page: PageRequest) -> Result<Vec<Product>, StoreError>;

    /// Number of live products.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Overwrite the supplied fields of a live product.
    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError>;

    /// Atomically remove `count` units if at least `count` are in stock.
    async fn sell(&self, id: ProductId, count: i64, at: DateTime<Utc>) -> Result<Product, StoreError>;

    /// Mark a live product deleted.
    async fn soft_delete(&self, id: ProductId, at: DateTime<Utc>) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        (**self).insert(product).await
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find(id).await
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Product>, StoreError> {
        (**self).list(page).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        (**self).count().await
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError> {
        (**self).update(id, changes).await
    }

    async fn sell(&self, id: ProductId, count: i64, at: DateTime<Utc>) -> Result<Product, StoreError> {
        (**self).sell(id, count, at).await
    }

    async fn soft_delete(&self, id: ProductId, at: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).soft_delete(id, at).await
    }
}
