//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, Mobile, RoleTitle, User, UserId, Username};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique column (mobile, username or email) is already taken.
        Duplicate { message: String } => "user already exists: {message}",
    }
}

/// Storage for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Replace the stored copy of `user`.
    ///
    /// Returns `false` when no row matched the id.
    async fn update(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by mobile number.
    async fn find_by_mobile(&self, mobile: &Mobile) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by username.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// List users, optionally filtered by a case-insensitive search over
    /// names, username, mobile and email. Newest first.
    async fn list(&self, search: Option<String>) -> Result<Vec<User>, UserPersistenceError>;

    /// Move every user holding role `from` to role `to`. Returns how many
    /// users changed.
    async fn reassign_role(
        &self,
        from: &RoleTitle,
        to: &RoleTitle,
    ) -> Result<usize, UserPersistenceError>;
}
