use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stockroom_core::{DomainError, Entity, PageRequest, ProductId};
use stockroom_products::{NewProduct, Product, ProductChanges};

use super::r#trait::{ProductStore, StoreError};

#[derive(Debug, Default)]
struct State {
    /// Every product ever inserted, soft-deleted ones included.
    products: BTreeMap<ProductId, Product>,
    /// Live name -> id.
    names: HashMap<String, ProductId>,
    last_id: u64,
}

impl State {
    fn live_mut(&mut self, id: ProductId) -> Result<&mut Product, StoreError> {
        self.products
            .get_mut(&id)
            .filter(|p| !p.is_deleted())
            .ok_or(StoreError::NotFound)
    }
}

/// In-memory product store.
///
/// Intended for tests/dev. Every mutation runs under one write lock, which
/// serializes check-and-write sequences such as `sell`.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    state: RwLock<State>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;

        if state.names.contains_key(&product.name) {
            return Err(StoreError::Duplicate(product.name));
        }

        state.last_id += 1;
        let id = ProductId::new(state.last_id);
        let created = Product::create(id, product);
        state.names.insert(created.name().to_string(), id);
        state.products.insert(id, created.clone());
        Ok(created)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.products.get(&id).filter(|p| !p.is_deleted()).cloned())
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Product>, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        let skip = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit).unwrap_or(0);

        Ok(state
            .products
            .values()
            .rev()
            .filter(|p| !p.is_deleted())
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.names.len() as u64)
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let old_name = state.live_mut(id)?.name().to_string();

        if let Some(new_name) = &changes.name {
            if let Some(owner) = state.names.get(new_name) {
                if *owner != id {
                    return Err(StoreError::Duplicate(new_name.clone()));
                }
            }
        }

        let product = state.live_mut(id)?;
        product.apply_changes(&changes);
        let updated = product.clone();

        if updated.name() != old_name {
            state.names.remove(&old_name);
            state.names.insert(updated.name().to_string(), id);
        }
        Ok(updated)
    }

    async fn sell(&self, id: ProductId, count: i64, at: DateTime<Utc>) -> Result<Product, StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let product = state.live_mut(id)?;

        match product.sell(count, at) {
            Ok(()) => Ok(product.clone()),
            Err(DomainError::InsufficientStock {
                requested,
                available,
            }) => Err(StoreError::InsufficientStock {
                requested,
                available,
            }),
            Err(DomainError::NotFound) => Err(StoreError::NotFound),
            Err(other) => Err(StoreError::Constraint(other.to_string())),
        }
    }

    async fn soft_delete(&self, id: ProductId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let product = state.live_mut(id)?;
        product
            .mark_deleted(at)
            .map_err(|_| StoreError::NotFound)?;
        let name = product.name().to_string();
        state.names.remove(&name);
        Ok(())
    }
}
