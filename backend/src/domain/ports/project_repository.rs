//! Port for project persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Project, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repositories.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
    }
}

/// Storage for projects. Every lookup is scoped to the owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// `owner`'s projects, newest first.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Project>, ProjectRepositoryError>;

    /// The project `id` if `owner` owns it.
    async fn find_owned(
        &self,
        owner: &UserId,
        id: Uuid,
    ) -> Result<Option<Project>, ProjectRepositoryError>;

    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    /// Replace a stored project. Returns `false` when it no longer exists.
    async fn update(&self, project: &Project) -> Result<bool, ProjectRepositoryError>;

    /// Delete `owner`'s project `id`. Returns `false` when nothing matched.
    async fn delete_owned(&self, owner: &UserId, id: Uuid) -> Result<bool, ProjectRepositoryError>;
}
