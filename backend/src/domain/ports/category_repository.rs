//! Port for category persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Category;

use super::define_port_error;

define_port_error! {
    /// Errors raised by category repositories.
    pub enum CategoryRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "category repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "category repository query failed: {message}",
        /// The title is already taken.
        Duplicate { title: String } => "category already exists: {title}",
    }
}

/// Storage for the category forest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Every category, ordered by title.
    async fn list_all(&self) -> Result<Vec<Category>, CategoryRepositoryError>;

    /// Fetch a category by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, CategoryRepositoryError>;

    /// Fetch a category by exact title.
    async fn find_by_title(&self, title: &str)
    -> Result<Option<Category>, CategoryRepositoryError>;

    /// Insert a new category.
    async fn insert(&self, category: &Category) -> Result<(), CategoryRepositoryError>;

    /// Rename a category. Returns `false` when the id is unknown.
    async fn update_title(&self, id: Uuid, title: &str) -> Result<bool, CategoryRepositoryError>;

    /// Delete the given categories, returning how many rows went away.
    async fn delete_many(&self, ids: Vec<Uuid>) -> Result<usize, CategoryRepositoryError>;
}
