//! Role and permission management plus the permission guard.
//!
//! Renames cascade: users follow a renamed role and roles follow a renamed
//! permission.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{PermissionRepository, RoleRepository, UserRepository};
use crate::domain::rbac::permissions;
use crate::domain::service_support::{map_rbac_error, map_user_error};
use crate::domain::{
    Error, Permission, PermissionChanges, PermissionDraft, Role, RoleChanges, RoleDraft, RoleTitle,
    User, UserId,
};

/// Message returned when the caller's role lacks a permission.
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this resource";

/// Whose records a caller may manage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    /// Only records the user owns.
    Own(UserId),
    /// Every record; granted by the `all` permission.
    Any,
}

impl OwnerScope {
    /// True when a record owned by `owner` is in scope.
    pub fn covers(&self, owner: &UserId) -> bool {
        match self {
            Self::Own(user) => user == owner,
            Self::Any => true,
        }
    }
}

/// Role and permission use-cases.
#[derive(Clone)]
pub struct RbacService {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    users: Arc<dyn UserRepository>,
}

impl RbacService {
    /// Create the service.
    pub fn new(
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            roles,
            permissions,
            users,
        }
    }

    /// Check that `user`'s role grants `required`.
    ///
    /// `None` only demands that the role exists.
    pub async fn require(&self, user: &User, required: Option<&str>) -> Result<(), Error> {
        if self.grants(user, required).await? {
            Ok(())
        } else {
            Err(Error::forbidden(FORBIDDEN_MESSAGE))
        }
    }

    /// Scope of records `user` may manage on behalf of their owners.
    pub async fn owner_scope(&self, user: &User) -> Result<OwnerScope, Error> {
        Ok(if self.grants(user, Some(permissions::ALL)).await? {
            OwnerScope::Any
        } else {
            OwnerScope::Own(user.id.clone())
        })
    }

    /// A missing role grants nothing.
    async fn grants(&self, user: &User, required: Option<&str>) -> Result<bool, Error> {
        Ok(self
            .roles
            .find_by_title(user.role.as_str())
            .await
            .map_err(map_rbac_error)?
            .is_some_and(|role| role.grants(required)))
    }

    /// Every role.
    pub async fn list_roles(&self) -> Result<Vec<Role>, Error> {
        self.roles.list().await.map_err(map_rbac_error)
    }

    /// Create a role whose permissions all exist.
    pub async fn create_role(&self, draft: RoleDraft) -> Result<Role, Error> {
        if self
            .roles
            .find_by_title(&draft.title)
            .await
            .map_err(map_rbac_error)?
            .is_some()
        {
            return Err(Error::conflict("Role is Existing"));
        }
        self.check_permissions_exist(&draft.permissions).await?;

        let role = draft.into_role();
        self.roles.insert(&role).await.map_err(map_rbac_error)?;
        info!(role = %role.title, "created role");
        Ok(role)
    }

    /// Apply `changes` to role `id`. Users holding the old title move to the
    /// new one.
    pub async fn edit_role(&self, id: Uuid, changes: RoleChanges) -> Result<Role, Error> {
        let mut role = self.find_role(id).await?;
        let previous = RoleTitle::new(role.title.as_str());
        if changes.is_empty() {
            return Ok(role);
        }
        if let Some(title) = changes.title.as_deref() {
            self.ensure_role_title_free(title, id).await?;
        }
        if let Some(permissions) = changes.permissions.as_deref() {
            self.check_permissions_exist(permissions).await?;
        }
        changes.apply(&mut role);
        if !self.roles.update(&role).await.map_err(map_rbac_error)? {
            return Err(Error::not_found("Role not found"));
        }
        if previous.as_str() != role.title {
            let moved = self
                .users
                .reassign_role(&previous, &RoleTitle::new(role.title.as_str()))
                .await
                .map_err(map_user_error)?;
            info!(from = %previous, to = %role.title, users = moved, "renamed role");
        }
        Ok(role)
    }

    /// Remove a role addressed by id or by title.
    pub async fn remove_role(&self, field: &str) -> Result<(), Error> {
        let role = match Uuid::parse_str(field) {
            Ok(id) => self.roles.find_by_id(id).await,
            Err(_) => self.roles.find_by_title(field).await,
        }
        .map_err(map_rbac_error)?
        .ok_or_else(|| Error::not_found("Role not found"))?;

        if !self.roles.delete(role.id).await.map_err(map_rbac_error)? {
            return Err(Error::not_found("Role not found"));
        }
        info!(role = %role.title, "removed role");
        Ok(())
    }

    /// Every permission.
    pub async fn list_permissions(&self) -> Result<Vec<Permission>, Error> {
        self.permissions.list().await.map_err(map_rbac_error)
    }

    /// Create a permission with a unique title.
    pub async fn create_permission(&self, draft: PermissionDraft) -> Result<Permission, Error> {
        if self
            .permissions
            .find_by_title(&draft.title)
            .await
            .map_err(map_rbac_error)?
            .is_some()
        {
            return Err(Error::conflict("Permission is Existing"));
        }
        let permission = draft.into_permission();
        self.permissions
            .insert(&permission)
            .await
            .map_err(map_rbac_error)?;
        Ok(permission)
    }

    /// Apply `changes` to permission `id`. Roles granting the old title are
    /// rewritten to grant the new one.
    pub async fn edit_permission(
        &self,
        id: Uuid,
        changes: PermissionChanges,
    ) -> Result<Permission, Error> {
        let mut permission = self
            .permissions
            .find_by_id(id)
            .await
            .map_err(map_rbac_error)?
            .ok_or_else(|| Error::not_found("Permission not found"))?;
        if changes.is_empty() {
            return Ok(permission);
        }
        if let Some(title) = changes.title.as_deref() {
            let taken = self
                .permissions
                .find_by_title(title)
                .await
                .map_err(map_rbac_error)?
                .is_some_and(|other| other.id != id);
            if taken {
                return Err(Error::conflict("Permission is Existing"));
            }
        }
        let previous = permission.title.clone();
        changes.apply(&mut permission);
        if !self
            .permissions
            .update(&permission)
            .await
            .map_err(map_rbac_error)?
        {
            return Err(Error::not_found("Permission not found"));
        }
        if previous != permission.title {
            let rewritten = self
                .roles
                .rename_permission(&previous, &permission.title)
                .await
                .map_err(map_rbac_error)?;
            info!(
                from = %previous,
                to = %permission.title,
                roles = rewritten,
                "renamed permission"
            );
        }
        Ok(permission)
    }

    /// Remove permission `id`.
    pub async fn remove_permission(&self, id: Uuid) -> Result<(), Error> {
        if self.permissions.delete(id).await.map_err(map_rbac_error)? {
            Ok(())
        } else {
            Err(Error::not_found("Permission not found"))
        }
    }

    async fn find_role(&self, id: Uuid) -> Result<Role, Error> {
        self.roles
            .find_by_id(id)
            .await
            .map_err(map_rbac_error)?
            .ok_or_else(|| Error::not_found("Role not found"))
    }

    async fn ensure_role_title_free(&self, title: &str, id: Uuid) -> Result<(), Error> {
        let taken = self
            .roles
            .find_by_title(title)
            .await
            .map_err(map_rbac_error)?
            .is_some_and(|other| other.id != id);
        if taken {
            return Err(Error::conflict("Role is Existing"));
        }
        Ok(())
    }

    async fn check_permissions_exist(&self, titles: &[String]) -> Result<(), Error> {
        if titles.is_empty() {
            return Ok(());
        }
        let known = self.permissions.list().await.map_err(map_rbac_error)?;
        if let Some(unknown) = titles
            .iter()
            .find(|title| !known.iter().any(|permission| &permission.title == *title))
        {
            return Err(Error::invalid_request(format!("Unknown permission: {unknown}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{MockPermissionRepository, MockRoleRepository, MockUserRepository};
    use crate::domain::{ErrorCode, Mobile, RoleTitle};

    fn role(title: &str, permissions: &[&str]) -> Role {
        Role {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            description: None,
            permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    fn permission(title: &str) -> Permission {
        Permission {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            description: None,
        }
    }

    fn user_with_role(title: &str) -> User {
        let mut user = User::from_mobile(Mobile::new("9121234567").expect("mobile"), Utc::now());
        user.role = RoleTitle::new(title);
        user
    }

    #[fixture]
    fn roles() -> MockRoleRepository {
        MockRoleRepository::new()
    }

    #[fixture]
    fn permissions() -> MockPermissionRepository {
        MockPermissionRepository::new()
    }

    fn service(roles: MockRoleRepository, permissions: MockPermissionRepository) -> RbacService {
        with_users(roles, permissions, MockUserRepository::new())
    }

    fn with_users(
        roles: MockRoleRepository,
        permissions: MockPermissionRepository,
        users: MockUserRepository,
    ) -> RbacService {
        RbacService::new(Arc::new(roles), Arc::new(permissions), Arc::new(users))
    }

    #[rstest]
    #[case("TEACHER", &["course", "blog", "profile"], Some("course"), true)]
    #[case("TEACHER", &["course", "blog", "profile"], Some("product"), false)]
    #[case("ADMIN", &["all"], Some("product"), true)]
    #[case("USER", &["profile"], None, true)]
    #[tokio::test]
    async fn guard_evaluates_role_permissions(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
        #[case] title: &str,
        #[case] granted: &'static [&'static str],
        #[case] required: Option<&str>,
        #[case] allowed: bool,
    ) {
        let stored = role(title, granted);
        roles
            .expect_find_by_title()
            .return_once(move |_| Ok(Some(stored)));

        let result = service(roles, permissions)
            .require(&user_with_role(title), required)
            .await;

        assert_eq!(result.is_ok(), allowed);
        if let Err(error) = result {
            assert_eq!(error.code(), ErrorCode::Forbidden);
            assert_eq!(error.message(), FORBIDDEN_MESSAGE);
        }
    }

    #[rstest]
    #[case("ADMIN", &["all"], true)]
    #[case("WRITER", &["blog", "profile"], false)]
    #[tokio::test]
    async fn owner_scope_widens_with_the_all_permission(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
        #[case] title: &str,
        #[case] granted: &'static [&'static str],
        #[case] any: bool,
    ) {
        let stored = role(title, granted);
        roles
            .expect_find_by_title()
            .return_once(move |_| Ok(Some(stored)));
        let user = user_with_role(title);

        let scope = service(roles, permissions)
            .owner_scope(&user)
            .await
            .expect("scope");

        assert_eq!(scope == OwnerScope::Any, any);
        assert!(scope.covers(&user.id));
        assert_eq!(scope.covers(&UserId::random()), any);
    }

    #[rstest]
    #[tokio::test]
    async fn guard_rejects_missing_role(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
    ) {
        roles.expect_find_by_title().return_once(|_| Ok(None));

        let error = service(roles, permissions)
            .require(&user_with_role("GHOST"), None)
            .await
            .expect_err("missing role");

        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn create_role_rejects_duplicates(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
    ) {
        roles
            .expect_find_by_title()
            .return_once(|_| Ok(Some(role("WRITER", &["blog"]))));
        let draft = RoleDraft::try_from_parts("WRITER", None, Vec::new()).expect("draft");

        let error = service(roles, permissions)
            .create_role(draft)
            .await
            .expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), "Role is Existing");
    }

    #[rstest]
    #[tokio::test]
    async fn create_role_rejects_unknown_permissions(
        mut roles: MockRoleRepository,
        mut permissions: MockPermissionRepository,
    ) {
        roles.expect_find_by_title().return_once(|_| Ok(None));
        permissions
            .expect_list()
            .return_once(|| Ok(vec![permission("blog")]));
        let draft = RoleDraft::try_from_parts("EDITOR", None, vec!["blog".into(), "news".into()])
            .expect("draft");

        let error = service(roles, permissions)
            .create_role(draft)
            .await
            .expect_err("unknown permission");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn remove_role_accepts_titles(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
    ) {
        let stored = role("WRITER", &["blog"]);
        let id = stored.id;
        roles
            .expect_find_by_title()
            .withf(|title| title == "WRITER")
            .return_once(move |_| Ok(Some(stored)));
        roles
            .expect_delete()
            .withf(move |candidate| *candidate == id)
            .return_once(|_| Ok(true));

        service(roles, permissions)
            .remove_role("WRITER")
            .await
            .expect("removed by title");
    }

    #[rstest]
    #[tokio::test]
    async fn remove_role_accepts_ids(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
    ) {
        let stored = role("WRITER", &["blog"]);
        let id = stored.id;
        roles
            .expect_find_by_id()
            .withf(move |candidate| *candidate == id)
            .return_once(move |_| Ok(Some(stored)));
        roles.expect_delete().return_once(|_| Ok(true));

        service(roles, permissions)
            .remove_role(&id.to_string())
            .await
            .expect("removed by id");
    }

    #[rstest]
    #[tokio::test]
    async fn remove_unknown_permission_is_not_found(
        roles: MockRoleRepository,
        mut permissions: MockPermissionRepository,
    ) {
        permissions.expect_delete().return_once(|_| Ok(false));

        let error = service(roles, permissions)
            .remove_permission(Uuid::new_v4())
            .await
            .expect_err("unknown id");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_a_role_moves_its_users(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
    ) {
        let stored = role("WRITER", &["blog"]);
        let id = stored.id;
        roles
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        roles.expect_find_by_title().return_once(|_| Ok(None));
        roles
            .expect_update()
            .withf(|role| role.title == "AUTHOR")
            .return_once(|_| Ok(true));
        let mut users = MockUserRepository::new();
        users
            .expect_reassign_role()
            .withf(|from, to| from.as_str() == "WRITER" && to.as_str() == "AUTHOR")
            .times(1)
            .return_once(|_, _| Ok(3));
        let changes = RoleChanges::try_from_parts(Some("AUTHOR".into()), None, None).expect("changes");

        let renamed = with_users(roles, permissions, users)
            .edit_role(id, changes)
            .await
            .expect("renamed");

        assert_eq!(renamed.title, "AUTHOR");
    }

    #[rstest]
    #[tokio::test]
    async fn editing_a_role_without_renaming_leaves_users_alone(
        mut roles: MockRoleRepository,
        permissions: MockPermissionRepository,
    ) {
        let stored = role("WRITER", &["blog"]);
        let id = stored.id;
        roles
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        roles.expect_update().return_once(|_| Ok(true));
        let mut users = MockUserRepository::new();
        users.expect_reassign_role().never();
        let changes =
            RoleChanges::try_from_parts(None, Some("Writes posts".into()), None).expect("changes");

        with_users(roles, permissions, users)
            .edit_role(id, changes)
            .await
            .expect("edited");
    }

    #[rstest]
    #[tokio::test]
    async fn renaming_a_permission_rewrites_granting_roles(
        mut roles: MockRoleRepository,
        mut permissions: MockPermissionRepository,
    ) {
        let stored = permission("blog");
        let id = stored.id;
        permissions
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(stored)));
        permissions.expect_find_by_title().return_once(|_| Ok(None));
        permissions.expect_update().return_once(|_| Ok(true));
        roles
            .expect_rename_permission()
            .withf(|from, to| from == "blog" && to == "posts")
            .times(1)
            .return_once(|_, _| Ok(2));
        let changes =
            PermissionChanges::try_from_parts(Some("posts".into()), None).expect("changes");

        let renamed = service(roles, permissions)
            .edit_permission(id, changes)
            .await
            .expect("renamed");

        assert_eq!(renamed.title, "posts");
    }
}
