//! Port for measuring video durations.

use std::path::Path;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by duration probes.
    pub enum VideoProbeError {
        /// The probe tool could not be started.
        Unavailable { message: String } => "video probe unavailable: {message}",
        /// The tool ran but did not report a duration.
        Failed { message: String } => "video probe failed: {message}",
    }
}

/// Reports the playing time of a video file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoDurationProbe: Send + Sync {
    /// Duration of the video at `path`, in seconds.
    async fn probe(&self, path: &Path) -> Result<f64, VideoProbeError>;
}
