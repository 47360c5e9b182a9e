//! Argon2id password hashing in PHC string format.
//!
//! Each hash or verification runs on tokio's blocking pool.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString};
use argon2::{Argon2, PasswordHasher as _};
use async_trait::async_trait;
use tokio::task;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Default-parameter Argon2id hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &str) -> Result<String, PasswordHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| PasswordHasherError::hash(error.to_string()))
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool, PasswordHasherError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|error| PasswordHasherError::malformed_hash(error.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(error) => Err(PasswordHasherError::hash(error.to_string())),
    }
}

async fn off_runtime<T, F>(work: F) -> Result<T, PasswordHasherError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, PasswordHasherError> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|error| PasswordHasherError::interrupted(error.to_string()))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        let password = password.to_owned();
        off_runtime(move || hash_blocking(&password)).await
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        let (password, hash) = (password.to_owned(), hash.to_owned());
        off_runtime(move || verify_blocking(&password, &hash)).await
    }
}
