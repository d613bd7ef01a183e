use axum::Router;

pub mod products;
pub mod system;

/// Versioned REST surface, mounted under `/api/v1`.
pub fn router() -> Router {
    Router::new().nest("/products", products::router())
}
