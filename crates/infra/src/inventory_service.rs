//! Inventory operations over a `ProductStore`.
//!
//! Every operation validates its command, makes exactly one store call for the
//! mutation, and maps failures into `InventoryError`. The service holds no
//! mutable state of its own; coordination between concurrent calls is the
//! store's job.

use thiserror::Error;
use tracing::{info, warn};

use stockroom_core::{DomainError, FieldErrors, PageRequest, ProductId};
use stockroom_products::{CreateProduct, DeleteProduct, Product, SellProduct, UpdateProduct};

use crate::product_store::{ProductStore, StoreError};

/// Service-level error, one variant per outcome a caller must tell apart.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("validation failed: {0}")]
    InvalidFields(FieldErrors),

    #[error("product not found")]
    NotFound,

    #[error("duplicate product: {0}")]
    Duplicate(String),

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error(transparent)]
    Storage(StoreError),
}

impl From<DomainError> for InventoryError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => InventoryError::Validation(msg),
            DomainError::InvalidFields(fields) => InventoryError::InvalidFields(fields),
            DomainError::InvalidId(msg) => InventoryError::Validation(msg),
            DomainError::NotFound => InventoryError::NotFound,
            DomainError::Duplicate(msg) => InventoryError::Duplicate(msg),
            DomainError::InsufficientStock {
                requested,
                available,
            } => InventoryError::InsufficientStock {
                requested,
                available,
            },
        }
    }
}

impl From<StoreError> for InventoryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => InventoryError::NotFound,
            StoreError::Duplicate(msg) => InventoryError::Duplicate(msg),
            StoreError::InsufficientStock {
                requested,
                available,
            } => InventoryError::InsufficientStock {
                requested,
                available,
            },
            other => InventoryError::Storage(other),
        }
    }
}

/// One window of live products plus the total live count.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: PageRequest,
}

#[derive(Debug)]
pub struct InventoryService<S> {
    store: S,
}

impl<S> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> InventoryService<S>
where
    S: ProductStore,
{
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, InventoryError> {
        let new = cmd.validate()?;
        let product = self.store.insert(new).await?;
        info!(
            product_id = %product.id_typed(),
            name = product.name(),
            stock_level = product.stock_level().units(),
            "product created"
        );
        Ok(product)
    }

    pub async fn list_products(&self, page: PageRequest) -> Result<ProductPage, InventoryError> {
        let items = self.store.list(page).await?;
        let total = self.store.count().await?;
        Ok(ProductPage { items, total, page })
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, InventoryError> {
        self.store.find(id).await?.ok_or(InventoryError::NotFound)
    }

    pub async fn update_product(&self, cmd: UpdateProduct) -> Result<Product, InventoryError> {
        let changes = cmd.validate()?;
        let product = self.store.update(cmd.product_id, changes).await?;
        info!(product_id = %product.id_typed(), "product updated");
        Ok(product)
    }

    /// Remove `cmd.count` units, or fail without touching stock.
    pub async fn sell(&self, cmd: SellProduct) -> Result<Product, InventoryError> {
        cmd.validate()?;

        match self
            .store
            .sell(cmd.product_id, cmd.count, cmd.occurred_at)
            .await
        {
            Ok(product) => {
                info!(
                    product_id = %cmd.product_id,
                    count = cmd.count,
                    remaining = product.stock_level().units(),
                    "sale recorded"
                );
                Ok(product)
            }
            Err(StoreError::InsufficientStock {
                requested,
                available,
            }) => {
                warn!(
                    product_id = %cmd.product_id,
                    requested,
                    available,
                    "sale rejected: insufficient stock"
                );
                Err(InventoryError::InsufficientStock {
                    requested,
                    available,
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    pub async fn delete_product(&self, cmd: DeleteProduct) -> Result<(), InventoryError> {
        self.store
            .soft_delete(cmd.product_id, cmd.occurred_at)
            .await?;
        info!(product_id = %cmd.product_id, "product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::product_store::InMemoryProductStore;

    fn service() -> InventoryService<InMemoryProductStore> {
        InventoryService::new(InMemoryProductStore::new())
    }

    fn create(name: &str, stock: i64) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: "d".to_string(),
            price: Decimal::new(2550, 2),
            stock_level: stock,
            occurred_at: Utc::now(),
        }
    }

    fn sale(id: ProductId, count: i64) -> SellProduct {
        SellProduct {
            product_id: id,
            count,
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_sell_delete_lifecycle() {
        let svc = service();
        let created = svc.create_product(create("Test", 100)).await.unwrap();
        let id = created.id_typed();

        let fetched = svc.get_product(id).await.unwrap();
        assert_eq!(fetched.name(), "Test");
        assert_eq!(fetched.description(), "d");
        assert_eq!(fetched.price().amount(), Decimal::new(2550, 2));
        assert_eq!(fetched.stock_level().units(), 100);

        let err = svc.sell(sale(id, 200)).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InsufficientStock {
                requested: 200,
                available: 100
            }
        ));
        assert_eq!(svc.get_product(id).await.unwrap().stock_level().units(), 100);

        let sold = svc.sell(sale(id, 50)).await.unwrap();
        assert_eq!(sold.stock_level().units(), 50);
        assert_eq!(svc.get_product(id).await.unwrap().stock_level().units(), 50);

        svc.delete_product(DeleteProduct {
            product_id: id,
            occurred_at: Utc::now(),
        })
        .await
        .unwrap();
        assert!(matches!(
            svc.get_product(id).await,
            Err(InventoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn second_create_with_same_name_is_duplicate() {
        let svc = service();
        svc.create_product(create("Test", 1)).await.unwrap();
        let err = svc.create_product(create("Test", 1)).await.unwrap_err();
        assert!(matches!(err, InventoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn invalid_create_reports_every_field() {
        let svc = service();
        let mut cmd = create("", -1);
        cmd.price = Decimal::ZERO;

        match svc.create_product(cmd).await {
            Err(InventoryError::InvalidFields(fields)) => {
                assert!(fields.get("name").is_some());
                assert!(fields.get("price").is_some());
                assert!(fields.get("stock").is_some());
                assert!(fields.get("description").is_none());
            }
            other => panic!("Expected InvalidFields, got {other:?}"),
        }
        assert_eq!(svc.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn get_is_idempotent() {
        let svc = service();
        let id = svc.create_product(create("a", 3)).await.unwrap().id_typed();

        let first = svc.get_product(id).await.unwrap();
        let second = svc.get_product(id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn list_reports_total_independent_of_window() {
        let svc = service();
        for i in 0..12 {
            svc.create_product(create(&format!("p{i}"), 1)).await.unwrap();
        }

        let page = svc.list_products(PageRequest::new(2, 10, 10)).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 12);
        assert_eq!(page.page.offset, 10);
    }

    #[tokio::test]
    async fn update_overwrites_only_supplied_fields() {
        let svc = service();
        let id = svc.create_product(create("a", 3)).await.unwrap().id_typed();

        let updated = svc
            .update_product(UpdateProduct {
                product_id: id,
                name: None,
                description: Some("new".to_string()),
                price: None,
                stock_level: Some(7),
                occurred_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(updated.name(), "a");
        assert_eq!(updated.description(), "new");
        assert_eq!(updated.price().amount(), Decimal::new(2550, 2));
        assert_eq!(updated.stock_level().units(), 7);
    }

    #[tokio::test]
    async fn update_missing_product_is_not_found() {
        let svc = service();
        let err = svc
            .update_product(UpdateProduct {
                product_id: ProductId::new(42),
                name: Some("x".to_string()),
                description: None,
                price: None,
                stock_level: None,
                occurred_at: Utc::now(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotFound));
    }

    #[tokio::test]
    async fn non_positive_sale_count_is_rejected() {
        let svc = service();
        let id = svc.create_product(create("a", 3)).await.unwrap().id_typed();

        let err = svc.sell(sale(id, 0)).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidFields(_)));
        assert_eq!(svc.get_product(id).await.unwrap().stock_level().units(), 3);
    }

    #[tokio::test]
    async fn delete_twice_is_not_found() {
        let svc = service();
        let id = svc.create_product(create("a", 3)).await.unwrap().id_typed();
        let cmd = DeleteProduct {
            product_id: id,
            occurred_at: Utc::now(),
        };

        svc.delete_product(cmd.clone()).await.unwrap();
        assert!(matches!(
            svc.delete_product(cmd).await,
            Err(InventoryError::NotFound)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_sales_never_oversell() {
        let svc = Arc::new(service());
        let initial = 100;
        let id = svc
            .create_product(create("hot", initial))
            .await
            .unwrap()
            .id_typed();

        let mut handles = Vec::new();
        for i in 0..64 {
            let svc = Arc::clone(&svc);
            let count = (i % 5) + 1;
            handles.push(tokio::spawn(async move {
                match svc.sell(sale(id, count)).await {
                    Ok(product) => {
                        assert!(product.stock_level().units() >= 0);
                        count
                    }
                    Err(InventoryError::InsufficientStock { .. }) => 0,
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }));
        }

        let mut sold = 0;
        for handle in handles {
            sold += handle.await.unwrap();
        }

        let remaining = svc.get_product(id).await.unwrap().stock_level().units();
        assert!(remaining >= 0);
        assert_eq!(remaining, initial - sold);
    }
}
