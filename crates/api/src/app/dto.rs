use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{FieldErrors, PageRequest};
use stockroom_infra::ProductPage;
use stockroom_products::Product;

// -------------------------
// Request DTOs
// -------------------------

/// Missing fields deserialize to empty values so that validation can report
/// every one of them by name instead of failing on the first.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, alias = "stockLevel")]
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(rename = "stockLevel", alias = "stock")]
    pub stock_level: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    /// Optional echo of the path id; must match when present.
    pub id: Option<u64>,
    #[serde(default)]
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    DuplicateEntity,
    Forbidden,
}

#[derive(Debug, Serialize)]
pub struct ProductData {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Product> for ProductData {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id_typed().get(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price().amount(),
            stock: p.stock_level().units(),
            created_at: p.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub current_page: i64,
    pub limit: i64,
    pub total_products: u64,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<ProductData>,
    pub meta: ListMeta,
}

impl ProductList {
    pub fn from_page(page: &ProductPage) -> Self {
        let PageRequest { page: current, limit, .. } = page.page;
        Self {
            products: page.items.iter().map(ProductData::from).collect(),
            meta: ListMeta {
                current_page: current,
                limit,
                total_products: page.total,
            },
        }
    }
}

/// `{status, message}` (plus `id` on create).
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

/// `{status, data}`.
#[derive(Debug, Serialize)]
pub struct DataBody<T> {
    pub status: Status,
    pub data: T,
}

/// `{status, errors: {field: message}}`.
#[derive(Debug, Serialize)]
pub struct FieldErrorsBody {
    pub status: Status,
    pub errors: BTreeMap<String, String>,
}

impl FieldErrorsBody {
    pub fn from_fields(fields: &FieldErrors) -> Self {
        Self {
            status: Status::BadRequest,
            errors: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// `{status, error}`; `status` is omitted for storage failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_uses_wire_names() {
        let got = serde_json::to_value([
            Status::Ok,
            Status::BadRequest,
            Status::NotFound,
            Status::DuplicateEntity,
            Status::Forbidden,
        ])
        .unwrap();
        assert_eq!(
            got,
            json!(["OK", "BAD_REQUEST", "NOT_FOUND", "DUPLICATE_ENTITY", "FORBIDDEN"])
        );
    }

    #[test]
    fn create_request_accepts_float_price_and_defaults_missing_fields() {
        let req: CreateProductRequest =
            serde_json::from_value(json!({"name": "Test", "price": 25.5})).unwrap();
        assert_eq!(req.name, "Test");
        assert_eq!(req.description, "");
        assert_eq!(req.price, Decimal::new(255, 1));
        assert_eq!(req.stock, 0);
    }

    #[test]
    fn update_request_reads_stock_level_key() {
        let req: UpdateProductRequest =
            serde_json::from_value(json!({"stockLevel": 7})).unwrap();
        assert_eq!(req.stock_level, Some(7));
        assert!(req.name.is_none());
        assert!(req.price.is_none());
    }

    #[test]
    fn message_body_omits_absent_id() {
        let body = MessageBody {
            status: Status::Ok,
            message: "done".to_string(),
            id: None,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({"status": "OK", "message": "done"})
        );
    }
}
