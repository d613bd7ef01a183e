//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::ProductId;
pub use pagination::{PageRequest, PageResolver, resolve_page};
pub use value_object::{Price, StockLevel, ValueObject, price_limit};
