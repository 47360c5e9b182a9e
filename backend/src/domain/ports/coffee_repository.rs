//! Port for coffee menu persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Coffee;

use super::define_port_error;

define_port_error! {
    /// Errors raised by coffee repositories.
    pub enum CoffeeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "coffee repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "coffee repository query failed: {message}",
    }
}

/// Storage for the coffee menu.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoffeeRepository: Send + Sync {
    /// Every item, newest first.
    async fn list(&self) -> Result<Vec<Coffee>, CoffeeRepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coffee>, CoffeeRepositoryError>;

    async fn insert(&self, coffee: &Coffee) -> Result<(), CoffeeRepositoryError>;

    /// Returns `false` when the id is unknown.
    async fn update(&self, coffee: &Coffee) -> Result<bool, CoffeeRepositoryError>;

    /// Returns `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, CoffeeRepositoryError>;
}
