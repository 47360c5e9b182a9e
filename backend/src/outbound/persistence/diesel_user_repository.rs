//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::RunQueryDsl;
use tracing::warn;

use super::diesel_error_mapping::{
    like_pattern, map_diesel_error, map_pool_error, search_term, unique_violation,
};
use super::models::{CorruptRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, Mobile, RoleTitle, User, UserId, Username};

/// Diesel-backed user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel(error: DieselError) -> UserPersistenceError {
    if let Some(constraint) = unique_violation(&error) {
        return UserPersistenceError::duplicate(duplicate_field(constraint));
    }
    map_diesel_error(
        &error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// `users_mobile_key` names the `mobile` column.
fn duplicate_field(constraint: &str) -> &str {
    constraint
        .strip_prefix("users_")
        .and_then(|rest| rest.strip_suffix("_key"))
        .unwrap_or(constraint)
}

fn to_domain(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(|err: CorruptRow| {
        warn!(error = %err, "skipping unreadable user row");
        UserPersistenceError::query(err.to_string())
    })
}

impl DieselUserRepository {
    async fn first(
        &self,
        query: users::BoxedQuery<'static, Pg>,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        query
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?
            .map(to_domain)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(users::table)
            .values(UserRow::from(user))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row = UserRow::from(user);
        diesel::update(users::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|count| count > 0)
            .map_err(map_diesel)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.first(users::table.filter(users::id.eq(*id.as_uuid())).into_boxed())
            .await
    }

    async fn find_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, UserPersistenceError> {
        self.first(users::table.filter(users::mobile.eq(mobile.to_string())).into_boxed())
            .await
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        let username = username.as_str().to_owned();
        self.first(users::table.filter(users::username.eq(username)).into_boxed())
            .await
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let email = email.as_str().to_owned();
        self.first(users::table.filter(users::email.eq(email)).into_boxed())
            .await
    }

    async fn list(&self, search: Option<String>) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut query = users::table
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .into_boxed();
        if let Some(term) = search_term(search) {
            let pattern = like_pattern(&term);
            query = query.filter(
                users::mobile
                    .nullable()
                    .ilike(pattern.clone())
                    .or(users::username.ilike(pattern.clone()))
                    .or(users::email.ilike(pattern.clone()))
                    .or(users::first_name.ilike(pattern.clone()))
                    .or(users::last_name.ilike(pattern)),
            );
        }
        query
            .load(&mut conn)
            .await
            .map_err(map_diesel)?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn reassign_role(
        &self,
        from: &RoleTitle,
        to: &RoleTitle,
    ) -> Result<usize, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::update(users::table.filter(users::role.eq(from.as_str())))
            .set(users::role.eq(to.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("users_mobile_key", "mobile")]
    #[case("users_username_key", "username")]
    #[case("unique", "unique")]
    fn constraint_names_map_to_columns(#[case] constraint: &str, #[case] field: &str) {
        assert_eq!(duplicate_field(constraint), field);
    }
}
