use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{
    DomainError, DomainResult, Entity, FieldErrors, Price, ProductId, StockLevel,
};

/// Entity: Product.
///
/// State changes go through the methods below so that `stock_level >= 0` and
/// `price > 0` hold for every instance. Stores decide *when* a change runs
/// (and under which lock); the entity decides *whether* it is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    stock_level: StockLevel,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Materialize a freshly inserted product under a store-assigned id.
    pub fn create(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            stock_level: new.stock_level,
            active: true,
            created_at: new.created_at,
            updated_at: new.created_at,
            deleted_at: None,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn stock_level(&self) -> StockLevel {
        self.stock_level
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Overwrite the supplied fields; anything `None` keeps its value.
    pub fn apply_changes(&mut self, changes: &ProductChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(stock_level) = changes.stock_level {
            self.stock_level = stock_level;
        }
        self.updated_at = changes.updated_at;
    }

    /// Take `count` units out of stock. Leaves the product untouched on error.
    pub fn sell(&mut self, count: i64, at: DateTime<Utc>) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::not_found());
        }
        self.stock_level = self.stock_level.take(count)?;
        self.updated_at = at;
        Ok(())
    }

    pub fn mark_deleted(&mut self, at: DateTime<Utc>) -> DomainResult<()> {
        if self.is_deleted() {
            return Err(DomainError::not_found());
        }
        self.deleted_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Plain-data view, e.g. for persistence.
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.amount(),
            stock_level: self.stock_level.units(),
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Unvalidated, storage-shaped product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_level: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: Price::try_new(record.price)?,
            stock_level: StockLevel::try_new(record.stock_level)?,
            active: record.active,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        })
    }
}

/// Validated insert payload (output of `CreateProduct::validate`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock_level: StockLevel,
    pub created_at: DateTime<Utc>,
}

/// Validated partial overwrite (output of `UpdateProduct::validate`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock_level: Option<StockLevel>,
    pub updated_at: DateTime<Utc>,
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_level: i64,
    pub occurred_at: DateTime<Utc>,
}

impl CreateProduct {
    /// Check every field and report all failures at once.
    pub fn validate(&self) -> DomainResult<NewProduct> {
        let mut errors = FieldErrors::new();
        check_text(&mut errors, "name", &self.name);
        check_text(&mut errors, "description", &self.description);
        let price = check_price(&mut errors, self.price);
        let stock_level = check_stock(&mut errors, self.stock_level);
        errors.into_result()?;

        match (price, stock_level) {
            (Some(price), Some(stock_level)) => Ok(NewProduct {
                name: self.name.clone(),
                description: self.description.clone(),
                price,
                stock_level,
                created_at: self.occurred_at,
            }),
            _ => Err(DomainError::validation("invalid product")),
        }
    }
}

/// Command: UpdateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_level: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

impl UpdateProduct {
    pub fn validate(&self) -> DomainResult<ProductChanges> {
        if self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock_level.is_none()
        {
            return Err(DomainError::validation("no fields to update"));
        }

        let mut errors = FieldErrors::new();
        if let Some(name) = &self.name {
            check_text(&mut errors, "name", name);
        }
        if let Some(description) = &self.description {
            check_text(&mut errors, "description", description);
        }
        let price = self.price.and_then(|p| check_price(&mut errors, p));
        let stock_level = self.stock_level.and_then(|s| check_stock(&mut errors, s));
        errors.into_result()?;

        Ok(ProductChanges {
            name: self.name.clone(),
            description: self.description.clone(),
            price,
            stock_level,
            updated_at: self.occurred_at,
        })
    }
}

/// Command: SellProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellProduct {
    pub product_id: ProductId,
    pub count: i64,
    pub occurred_at: DateTime<Utc>,
}

impl SellProduct {
    pub fn validate(&self) -> DomainResult<()> {
        if self.count <= 0 {
            let mut errors = FieldErrors::new();
            errors.add("count", "count must be greater than 0");
            return errors.into_result();
        }
        Ok(())
    }
}

/// Command: DeleteProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProduct {
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

fn check_text(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{field} is required"));
    }
}

fn check_price(errors: &mut FieldErrors, amount: Decimal) -> Option<Price> {
    match Price::try_new(amount) {
        Ok(price) => Some(price),
        Err(DomainError::Validation(msg)) => {
            errors.add("price", msg);
            None
        }
        Err(other) => {
            errors.add("price", other.to_string());
            None
        }
    }
}

fn check_stock(errors: &mut FieldErrors, units: i64) -> Option<StockLevel> {
    match StockLevel::try_new(units) {
        Ok(stock) => Some(stock),
        Err(_) => {
            errors.add("stock", "stock cannot be negative");
            None
        }
    }
}
