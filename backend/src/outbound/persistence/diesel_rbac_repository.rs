//! PostgreSQL-backed role and permission repositories.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::sql_types::{Array, Text};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{PermissionRow, RoleRow};
use super::pool::{DbPool, PoolError};
use super::schema::{permissions, roles};
use crate::domain::ports::{PermissionRepository, RbacRepositoryError, RoleRepository};
use crate::domain::{Permission, Role};

diesel::define_sql_function! {
    /// Postgres `array_replace(array, from, to)`.
    fn array_replace(array: Array<Text>, from: Text, to: Text) -> Array<Text>;
}

fn map_pool(error: PoolError) -> RbacRepositoryError {
    map_pool_error(error, RbacRepositoryError::connection)
}

/// Unique violations report `title`, the only unique column besides the key.
fn map_diesel(error: DieselError, title: &str) -> RbacRepositoryError {
    if is_unique_violation(&error) {
        return RbacRepositoryError::duplicate(title);
    }
    map_diesel_error(
        &error,
        RbacRepositoryError::query,
        RbacRepositoryError::connection,
    )
}

fn map_read(error: DieselError) -> RbacRepositoryError {
    map_diesel(error, "")
}

/// Diesel-backed role repository.
#[derive(Clone)]
pub struct DieselRoleRepository {
    pool: DbPool,
}

impl DieselRoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for DieselRoleRepository {
    async fn list(&self) -> Result<Vec<Role>, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<RoleRow> = roles::table
            .select(RoleRow::as_select())
            .order(roles::title.asc())
            .load(&mut conn)
            .await
            .map_err(map_read)?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Role>, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        roles::table
            .find(id)
            .select(RoleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Role::from))
            .map_err(map_read)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Role>, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        roles::table
            .filter(roles::title.eq(title))
            .select(RoleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Role::from))
            .map_err(map_read)
    }

    async fn insert(&self, role: &Role) -> Result<(), RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(roles::table)
            .values(RoleRow::from(role))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel(err, &role.title))
    }

    async fn update(&self, role: &Role) -> Result<bool, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(roles::table.find(role.id))
            .set(&RoleRow::from(role))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(|err| map_diesel(err, &role.title))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(roles::table.find(id))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_read)
    }

    async fn rename_permission(&self, from: &str, to: &str) -> Result<usize, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(roles::table.filter(roles::permissions.contains(vec![from.to_owned()])))
            .set(roles::permissions.eq(array_replace(roles::permissions, from, to)))
            .execute(&mut conn)
            .await
            .map_err(map_read)
    }
}

/// Diesel-backed permission repository.
#[derive(Clone)]
pub struct DieselPermissionRepository {
    pool: DbPool,
}

impl DieselPermissionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for DieselPermissionRepository {
    async fn list(&self) -> Result<Vec<Permission>, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<PermissionRow> = permissions::table
            .select(PermissionRow::as_select())
            .order(permissions::title.asc())
            .load(&mut conn)
            .await
            .map_err(map_read)?;
        Ok(rows.into_iter().map(Permission::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Permission>, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        permissions::table
            .find(id)
            .select(PermissionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Permission::from))
            .map_err(map_read)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Permission>, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        permissions::table
            .filter(permissions::title.eq(title))
            .select(PermissionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Permission::from))
            .map_err(map_read)
    }

    async fn insert(&self, permission: &Permission) -> Result<(), RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(permissions::table)
            .values(PermissionRow::from(permission))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel(err, &permission.title))
    }

    async fn update(&self, permission: &Permission) -> Result<bool, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(permissions::table.find(permission.id))
            .set(&PermissionRow::from(permission))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(|err| map_diesel(err, &permission.title))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RbacRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::delete(permissions::table.find(id))
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_read)
    }
}
