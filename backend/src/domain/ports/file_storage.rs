//! Port for storing uploaded files.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::upload::IncomingFile;

use super::define_port_error;

define_port_error! {
    /// Errors raised by file storage adapters.
    pub enum FileStorageError {
        /// A filesystem operation failed.
        Io { path: String, message: String } => "file storage failed at {path}: {message}",
        /// The relative path tried to escape the upload root.
        InvalidPath { path: String } => "refusing to touch path outside the upload root: {path}",
    }
}

/// Moves uploads into permanent storage and removes them again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Move `file` to `relative_path`, creating parent directories.
    async fn store(&self, file: &IncomingFile, relative_path: &str) -> Result<(), FileStorageError>;

    /// Delete `relative_path`. A missing file is not an error.
    async fn remove(&self, relative_path: &str) -> Result<(), FileStorageError>;

    /// Absolute location of `relative_path`.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, FileStorageError>;
}
