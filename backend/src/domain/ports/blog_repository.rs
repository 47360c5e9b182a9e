//! Port for blog persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Blog;

use super::define_port_error;

define_port_error! {
    /// Errors raised by blog repositories.
    pub enum BlogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "blog repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "blog repository query failed: {message}",
    }
}

/// Storage for blog posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlogRepository: Send + Sync {
    /// Every post, newest first.
    async fn list(&self) -> Result<Vec<Blog>, BlogRepositoryError>;

    /// Fetch a post by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Blog>, BlogRepositoryError>;

    /// Insert a new post.
    async fn insert(&self, blog: &Blog) -> Result<(), BlogRepositoryError>;

    /// Replace a stored post. Returns `false` when the id is unknown.
    async fn update(&self, blog: &Blog) -> Result<bool, BlogRepositoryError>;

    /// Delete a post. Returns `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, BlogRepositoryError>;
}
