//! Refresh tokens kept in Redis under `refresh:<user id>`.
//!
//! `SET ... EX` overwrites the previous token, so a user only ever holds the
//! most recently issued refresh token.

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use tracing::debug;

use crate::domain::UserId;
use crate::domain::ports::{RefreshTokenStore, RefreshTokenStoreError};

/// Redis key holding the refresh token of `user_id`.
///
/// # Examples
/// ```
/// use campus::domain::UserId;
/// use campus::outbound::cache::refresh_token_key;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
/// assert_eq!(refresh_token_key(&id), "refresh:3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
pub fn refresh_token_key(user_id: &UserId) -> String {
    format!("refresh:{user_id}")
}

/// `bb8` pooled Redis refresh token store.
#[derive(Clone)]
pub struct RedisRefreshTokenStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisRefreshTokenStore {
    /// Connect a pool to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshTokenStoreError::Connection`] when the URL is invalid
    /// or the pool cannot be built.
    pub async fn connect(redis_url: &str) -> Result<Self, RefreshTokenStoreError> {
        let manager = RedisConnectionManager::new(redis_url)
            .map_err(|err| RefreshTokenStoreError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(|err| RefreshTokenStoreError::connection(err.to_string()))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn new(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn store(
        &self,
        user_id: &UserId,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), RefreshTokenStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| RefreshTokenStoreError::connection(err.to_string()))?;
        let key = refresh_token_key(user_id);
        conn.set_ex::<_, _, ()>(&key, token, ttl_secs)
            .await
            .map_err(|err| RefreshTokenStoreError::command(err.to_string()))?;
        debug!(%key, ttl_secs, "stored refresh token");
        Ok(())
    }

    async fn fetch(&self, user_id: &UserId) -> Result<Option<String>, RefreshTokenStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| RefreshTokenStoreError::connection(err.to_string()))?;
        conn.get::<_, Option<String>>(refresh_token_key(user_id))
            .await
            .map_err(|err| RefreshTokenStoreError::command(err.to_string()))
    }
}
