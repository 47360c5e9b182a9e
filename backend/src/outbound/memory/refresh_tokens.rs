//! In-memory `RefreshTokenStore`.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::domain::UserId;
use crate::domain::ports::{RefreshTokenStore, RefreshTokenStoreError};

/// Refresh tokens with expiry, kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    tokens: Mutex<HashMap<UserId, (String, Instant)>>,
}

impl InMemoryRefreshTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn store(
        &self,
        user_id: &UserId,
        token: &str,
        ttl_secs: u64,
    ) -> Result<(), RefreshTokenStoreError> {
        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(ttl_secs))
            .ok_or_else(|| RefreshTokenStoreError::command("ttl out of range"))?;
        self.tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.clone(), (token.to_owned(), expires_at));
        Ok(())
    }

    async fn fetch(&self, user_id: &UserId) -> Result<Option<String>, RefreshTokenStoreError> {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        match tokens.get(user_id) {
            Some((token, expires_at)) if *expires_at > Instant::now() => Ok(Some(token.clone())),
            Some(_) => {
                tokens.remove(user_id);
                Ok(None)
            }
            None => Ok(None),
        }
    }
}
