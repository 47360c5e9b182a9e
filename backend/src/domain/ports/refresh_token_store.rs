//! Port for the refresh token key-value store.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by refresh token stores.
    pub enum RefreshTokenStoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "refresh token store connection failed: {message}",
        /// The command failed after connecting.
        Command { message: String } => "refresh token store command failed: {message}",
    }
}

/// Keeps the latest refresh token per user.
///
/// Storing a token overwrites the previous one, so only the most recently
/// issued refresh token is ever accepted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Store `token` for `user_id` with a time to live in seconds.
    async fn store(
        &self,
        user_id: &UserId,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), RefreshTokenStoreError>;

    /// Fetch the stored token, if present and unexpired.
    async fn fetch(&self, user_id: &UserId) -> Result<Option<String>, RefreshTokenStoreError>;
}
