//! Upload and video doubles.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;

use crate::domain::ports::{VideoDurationProbe, VideoProbeError};

/// Reports the same duration for every video.
#[derive(Debug, Clone, Copy)]
pub struct FixedDurationProbe(pub f64);

#[async_trait]
impl VideoDurationProbe for FixedDurationProbe {
    async fn probe(&self, path: &Path) -> Result<f64, VideoProbeError> {
        if path.as_os_str().is_empty() {
            return Err(VideoProbeError::failed("empty path"));
        }
        Ok(self.0)
    }
}

/// A throwaway upload root plus a scratch area for incoming files.
pub struct TempUploads {
    root: TempDir,
    scratch: TempDir,
}

impl TempUploads {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            root: TempDir::new()?,
            scratch: TempDir::new()?,
        })
    }

    /// Directory stored uploads land in.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Directory incoming files are spooled into.
    pub fn scratch(&self) -> &Path {
        self.scratch.path()
    }

    /// Write `contents` to a scratch file, as the multipart reader would.
    pub fn incoming(&self, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.scratch.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
