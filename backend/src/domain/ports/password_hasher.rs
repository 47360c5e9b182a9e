//! Port for one-way password hashing.
//!
//! Adapters run hashing off the async worker threads.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashers.
    pub enum PasswordHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
        /// The blocking hashing task did not complete.
        Interrupted { message: String } => "password hashing task failed: {message}",
    }
}

/// Hashes and verifies passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` into a self-describing string.
    async fn hash(&self, password: &str) -> Result<String, PasswordHasherError>;

    /// Check `password` against `hash`.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError>;
}
