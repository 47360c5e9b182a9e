//! Video durations read with the `ffprobe` command line tool.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::domain::ports::{VideoDurationProbe, VideoProbeError};

/// Runs `ffprobe -v quiet -show_entries format=duration -of csv=p=0 <file>`.
#[derive(Debug, Clone)]
pub struct FfprobeDurationProbe {
    binary: PathBuf,
}

impl FfprobeDurationProbe {
    /// Probe with the executable at `binary`, usually just `ffprobe`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfprobeDurationProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

/// Parse the single `csv=p=0` duration line.
fn parse_duration(stdout: &str) -> Result<f64, VideoProbeError> {
    let line = stdout.lines().next().unwrap_or_default().trim();
    let seconds: f64 = line
        .parse()
        .map_err(|_| VideoProbeError::failed(format!("unexpected ffprobe output {line:?}")))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(VideoProbeError::failed(format!("invalid duration {seconds}")));
    }
    Ok(seconds)
}

#[async_trait]
impl VideoDurationProbe for FfprobeDurationProbe {
    async fn probe(&self, path: &Path) -> Result<f64, VideoProbeError> {
        let output = Command::new(&self.binary)
            .args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"])
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| {
                VideoProbeError::unavailable(format!("{}: {err}", self.binary.display()))
            })?;
        if !output.status.success() {
            return Err(VideoProbeError::failed(format!(
                "ffprobe exited with {}",
                output.status
            )));
        }
        let seconds = parse_duration(&String::from_utf8_lossy(&output.stdout))?;
        debug!(path = %path.display(), seconds, "ffprobe reported duration");
        Ok(seconds)
    }
}
