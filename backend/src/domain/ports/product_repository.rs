//! Port for product persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Product;

use super::define_port_error;

define_port_error! {
    /// Errors raised by product repositories.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
    }
}

/// Storage for store products.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Products newest first, optionally filtered by a case-insensitive
    /// search over title, short text and text.
    async fn list(&self, search: Option<String>) -> Result<Vec<Product>, ProductRepositoryError>;

    /// Fetch a product by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ProductRepositoryError>;

    /// Insert a new product.
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError>;

    /// Replace a stored product. Returns `false` when the id is unknown.
    async fn update(&self, product: &Product) -> Result<bool, ProductRepositoryError>;

    /// Delete a product. Returns `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, ProductRepositoryError>;
}
