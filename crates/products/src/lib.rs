//! Products domain module.
//!
//! This crate contains business rules for the product catalogue and its stock,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{
    CreateProduct, DeleteProduct, NewProduct, Product, ProductChanges, ProductRecord,
    SellProduct, UpdateProduct,
};
