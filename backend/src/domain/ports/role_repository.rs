//! Ports for role and permission persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Permission, Role};

use super::define_port_error;

define_port_error! {
    /// Errors raised by role and permission repositories.
    pub enum RbacRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "rbac repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "rbac repository query failed: {message}",
        /// The title is already taken.
        Duplicate { title: String } => "title already exists: {title}",
    }
}

/// Storage for roles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Every role, ordered by title.
    async fn list(&self) -> Result<Vec<Role>, RbacRepositoryError>;

    /// Fetch a role by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, RbacRepositoryError>;

    /// Fetch a role by exact title.
    async fn find_by_title(&self, title: &str) -> Result<Option<Role>, RbacRepositoryError>;

    /// Insert a new role.
    async fn insert(&self, role: &Role) -> Result<(), RbacRepositoryError>;

    /// Replace a stored role. Returns `false` when the id is unknown.
    async fn update(&self, role: &Role) -> Result<bool, RbacRepositoryError>;

    /// Delete a role. Returns `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, RbacRepositoryError>;

    /// Replace permission title `from` with `to` in every role granting it.
    /// Returns how many roles changed.
    async fn rename_permission(&self, from: &str, to: &str) -> Result<usize, RbacRepositoryError>;
}

/// Storage for permissions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Every permission, ordered by title.
    async fn list(&self) -> Result<Vec<Permission>, RbacRepositoryError>;

    /// Fetch a permission by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, RbacRepositoryError>;

    /// Fetch a permission by exact title.
    async fn find_by_title(&self, title: &str) -> Result<Option<Permission>, RbacRepositoryError>;

    /// Insert a new permission.
    async fn insert(&self, permission: &Permission) -> Result<(), RbacRepositoryError>;

    /// Replace a stored permission. Returns `false` when the id is unknown.
    async fn update(&self, permission: &Permission) -> Result<bool, RbacRepositoryError>;

    /// Delete a permission. Returns `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, RbacRepositoryError>;
}
