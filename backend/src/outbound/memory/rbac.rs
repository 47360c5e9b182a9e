//! In-memory role and permission repositories.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{PermissionRepository, RbacRepositoryError, RoleRepository};
use crate::domain::rbac::{DEFAULT_PERMISSIONS, DEFAULT_ROLES};
use crate::domain::{Permission, Role};

use super::table::Table;

/// Roles kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    roles: Table<Role>,
}

impl InMemoryRoleRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding the default roles.
    pub fn seeded() -> Self {
        let roles = DEFAULT_ROLES
            .iter()
            .map(|(title, permissions)| Role {
                id: Uuid::new_v4(),
                title: (*title).to_owned(),
                description: None,
                permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
            })
            .collect();
        Self {
            roles: Table::with_rows(roles),
        }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn list(&self) -> Result<Vec<Role>, RbacRepositoryError> {
        Ok(self.roles.read(<[Role]>::to_vec))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, RbacRepositoryError> {
        Ok(self.roles.find(|role| role.id == id))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Role>, RbacRepositoryError> {
        Ok(self.roles.find(|role| role.title == title))
    }

    async fn insert(&self, role: &Role) -> Result<(), RbacRepositoryError> {
        self.roles.write(|rows| {
            if rows.iter().any(|other| other.title == role.title) {
                return Err(RbacRepositoryError::duplicate(role.title.as_str()));
            }
            rows.push(role.clone());
            Ok(())
        })
    }

    async fn update(&self, role: &Role) -> Result<bool, RbacRepositoryError> {
        Ok(self.roles.replace(role.clone(), |other| other.id == role.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RbacRepositoryError> {
        Ok(self.roles.remove(|role| role.id == id) > 0)
    }

    async fn rename_permission(&self, from: &str, to: &str) -> Result<usize, RbacRepositoryError> {
        Ok(self.roles.write(|rows| {
            let mut changed = 0;
            for role in rows.iter_mut() {
                let mut granted = role.permissions.iter_mut();
                if let Some(title) = granted.find(|title| title.as_str() == from) {
                    to.clone_into(title);
                    changed += 1;
                }
            }
            changed
        }))
    }
}

/// Permissions kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPermissionRepository {
    permissions: Table<Permission>,
}

impl InMemoryPermissionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding the default permissions.
    pub fn seeded() -> Self {
        let permissions = DEFAULT_PERMISSIONS
            .iter()
            .map(|title| Permission {
                id: Uuid::new_v4(),
                title: (*title).to_owned(),
                description: None,
            })
            .collect();
        Self {
            permissions: Table::with_rows(permissions),
        }
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn list(&self) -> Result<Vec<Permission>, RbacRepositoryError> {
        Ok(self.permissions.read(<[Permission]>::to_vec))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, RbacRepositoryError> {
        Ok(self.permissions.find(|permission| permission.id == id))
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Permission>, RbacRepositoryError> {
        Ok(self.permissions.find(|permission| permission.title == title))
    }

    async fn insert(&self, permission: &Permission) -> Result<(), RbacRepositoryError> {
        self.permissions.write(|rows| {
            if rows.iter().any(|other| other.title == permission.title) {
                return Err(RbacRepositoryError::duplicate(permission.title.as_str()));
            }
            rows.push(permission.clone());
            Ok(())
        })
    }

    async fn update(&self, permission: &Permission) -> Result<bool, RbacRepositoryError> {
        Ok(self
            .permissions
            .replace(permission.clone(), |other| other.id == permission.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RbacRepositoryError> {
        Ok(self.permissions.remove(|permission| permission.id == id) > 0)
    }
}
