//! Uploads stored on the local filesystem beneath a single root directory.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::domain::IncomingFile;
use crate::domain::ports::{FileStorage, FileStorageError};

/// Moves incoming temp files under `root` and deletes them again.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory every relative path is resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn io_error(path: &Path, error: &std::io::Error) -> FileStorageError {
        FileStorageError::io(path.display().to_string(), error.to_string())
    }
}

/// Join `relative` onto `root`, refusing anything but plain components.
fn confine(root: &Path, relative: &str) -> Result<PathBuf, FileStorageError> {
    let candidate = Path::new(relative);
    let plain = !relative.is_empty()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !plain {
        return Err(FileStorageError::invalid_path(relative));
    }
    Ok(root.join(candidate))
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn store(&self, file: &IncomingFile, relative_path: &str) -> Result<(), FileStorageError> {
        let target = confine(&self.root, relative_path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| Self::io_error(parent, &err))?;
        }
        // Claim the name first; an existing file is never replaced.
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|err| Self::io_error(&target, &err))?;
        if fs::rename(&file.temp_path, &target).await.is_err() {
            // Temp dirs often sit on another filesystem.
            if let Err(err) = fs::copy(&file.temp_path, &target).await {
                let _ = fs::remove_file(&target).await;
                return Err(Self::io_error(&target, &err));
            }
            if let Err(err) = fs::remove_file(&file.temp_path).await {
                debug!(path = %file.temp_path.display(), error = %err, "temp upload left behind");
            }
        }
        debug!(path = %target.display(), bytes = file.size, "stored upload");
        Ok(())
    }

    async fn remove(&self, relative_path: &str) -> Result<(), FileStorageError> {
        let target = confine(&self.root, relative_path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(&target, &err)),
        }
    }

    fn resolve(&self, relative_path: &str) -> Result<PathBuf, FileStorageError> {
        confine(&self.root, relative_path)
    }
}
