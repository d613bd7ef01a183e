//! Product persistence boundary.
//!
//! The service layer talks to `ProductStore` only. Two backends exist:
//! `InMemoryProductStore` for tests and local runs, and `PostgresProductStore`
//! for deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductStore;
pub use postgres::PostgresProductStore;
pub use r#trait::{ProductStore, StoreError};
