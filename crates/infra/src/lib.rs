//! Infrastructure layer: product persistence, the inventory service, config.

pub mod config;
pub mod inventory_service;
pub mod product_store;

pub use config::{AppConfig, ConfigError};
pub use inventory_service::{InventoryError, InventoryService, ProductPage};
