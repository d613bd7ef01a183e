//! Postgres-backed product store implementation.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Duplicate` | Live product with the same name |
//! | Database (check constraint violation) | `23514` | `Constraint` | Negative stock or non-positive price reached the database |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | PoolClosed | N/A | `Backend` | Connection pool was closed |
//! | Other | N/A | `Backend` | Network errors, connection failures, etc. |
//!
//! ## Sale atomicity
//!
//! `sell` is one conditional `UPDATE ... WHERE stock_level >= $count`. Postgres
//! takes the row lock for the update and re-evaluates the predicate against the
//! latest committed row, so two concurrent sales can never both pass the check
//! on the same units. A zero-row result is classified (missing vs insufficient)
//! inside the same transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use stockroom_core::{PageRequest, ProductId};
use stockroom_products::{NewProduct, Product, ProductChanges, ProductRecord};

use super::r#trait::{ProductStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_create_products.sql");

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, stock_level, active, created_at, updated_at, deleted_at";

/// Postgres-backed product store.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    /// Create a new PostgresProductStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the products schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    #[instrument(skip(self, product), fields(name = %product.name, product_id = tracing::field::Empty), err)]
    pub async fn insert_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO products (name, description, price, stock_level, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, TRUE, $5, $5)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price.amount())
            .bind(product.stock_level.units())
            .bind(product.created_at)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate(product.name.clone())
                } else {
                    map_sqlx_error("insert_product", e)
                }
            })?;

        let created = product_from_row(&row)?;
        Span::current().record("product_id", created.id_typed().get());
        Ok(created)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let Some(db_id) = to_db_id(id) else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(db_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), fields(offset = page.offset, limit = page.limit), err)]
    pub async fn list_products(&self, page: PageRequest) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE deleted_at IS NULL
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    #[instrument(skip(self), err)]
    pub async fn count_products(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM products WHERE deleted_at IS NULL")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_products", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| StoreError::Corrupt(format!("failed to read count: {e}")))?;
        u64::try_from(total).map_err(|e| StoreError::Corrupt(format!("negative count: {e}")))
    }

    #[instrument(skip(self, changes), fields(product_id = %id), err)]
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, StoreError> {
        let db_id = to_db_id(id).ok_or(StoreError::NotFound)?;

        let sql = format!(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock_level = COALESCE($5, stock_level),
                updated_at = $6
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(db_id)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.price.map(|p| p.amount()))
            .bind(changes.stock_level.map(|s| s.units()))
            .bind(changes.updated_at)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Duplicate(changes.name.clone().unwrap_or_default())
                } else {
                    map_sqlx_error("update_product", e)
                }
            })?;

        match row {
            Some(row) => product_from_row(&row),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self), fields(product_id = %id, count = count), err)]
    pub async fn sell_product(
        &self,
        id: ProductId,
        count: i64,
        at: DateTime<Utc>,
    ) -> Result<Product, StoreError> {
        let db_id = to_db_id(id).ok_or(StoreError::NotFound)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let sql = format!(
            r#"
            UPDATE products
            SET stock_level = stock_level - $2,
                updated_at = $3
            WHERE id = $1 AND deleted_at IS NULL AND stock_level >= $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let sold = sqlx::query(&sql)
            .bind(db_id)
            .bind(count)
            .bind(at)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("sell_product", e))?;

        if let Some(row) = sold {
            let product = product_from_row(&row)?;
            tx.commit()
                .await
                .map_err(|e| map_sqlx_error("commit_transaction", e))?;
            return Ok(product);
        }

        // Nothing updated: find out why.
        let available: Option<i64> = sqlx::query(
            "SELECT stock_level FROM products WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(db_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("classify_sale", e))?
        .map(|row| row.try_get::<i64, _>("stock_level"))
        .transpose()
        .map_err(|e| StoreError::Corrupt(format!("failed to read stock_level: {e}")))?;

        tx.rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))?;

        match available {
            Some(available) => Err(StoreError::InsufficientStock {
                requested: count,
                available,
            }),
            None => Err(StoreError::NotFound),
        }
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn soft_delete_product(
        &self,
        id: ProductId,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let db_id = to_db_id(id).ok_or(StoreError::NotFound)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET deleted_at = $2,
                updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(db_id)
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("soft_delete_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        self.insert_product(product).await
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.find_product(id).await
    }

    async fn list(&self, page: PageRequest) -> Result<Vec<Product>, StoreError> {
        self.list_products(page).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.count_products().await
    }

    async fn update(&self, id: ProductId, changes: ProductChanges) -> Result<Product, StoreError> {
        self.update_product(id, changes).await
    }

    async fn sell(&self, id: ProductId, count: i64, at: DateTime<Utc>) -> Result<Product, StoreError> {
        self.sell_product(id, count, at).await
    }

    async fn soft_delete(&self, id: ProductId, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.soft_delete_product(id, at).await
    }
}

/// Ids beyond `i64::MAX` cannot exist in a BIGSERIAL column.
fn to_db_id(id: ProductId) -> Option<i64> {
    i64::try_from(id.get()).ok()
}

fn product_from_row(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
    let corrupt = |e: sqlx::Error| StoreError::Corrupt(format!("failed to read product row: {e}"));

    let id: i64 = row.try_get("id").map_err(corrupt)?;
    let id = u64::try_from(id)
        .map_err(|e| StoreError::Corrupt(format!("negative product id: {e}")))?;

    let record = ProductRecord {
        id: ProductId::new(id),
        name: row.try_get("name").map_err(corrupt)?,
        description: row.try_get("description").map_err(corrupt)?,
        price: row.try_get::<Decimal, _>("price").map_err(corrupt)?,
        stock_level: row.try_get("stock_level").map_err(corrupt)?,
        active: row.try_get("active").map_err(corrupt)?,
        created_at: row.try_get("created_at").map_err(corrupt)?,
        updated_at: row.try_get("updated_at").map_err(corrupt)?,
        deleted_at: row.try_get("deleted_at").map_err(corrupt)?,
    };

    Product::try_from(record).map_err(|e| StoreError::Corrupt(e.to_string()))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
