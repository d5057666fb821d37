//! Audio duration probing via an external `ffprobe`.
//!
//! The generator only depends on the [`DurationProber`] trait, so tests swap
//! in closures that return fixed durations or simulated failures.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single duration probe. All of them are non-fatal to feed
/// generation: the episode is emitted without `<itunes:duration>`.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The audio file does not exist.
    #[error("File not found: {0}")]
    Missing(PathBuf),
    /// The probe executable could not be started.
    #[error("Failed to run ffprobe: {0}")]
    Spawn(#[from] std::io::Error),
    /// The probe ran longer than the configured bound and was killed.
    #[error("ffprobe timed out after {0:?}")]
    Timeout(Duration),
    /// The probe exited unsuccessfully.
    #[error("ffprobe exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    /// The probe's output was not a number of seconds.
    #[error("Unparsable ffprobe output: {0:?}")]
    Unparsable(String),
}

/// Measures the playing time of an audio file in seconds.
pub trait DurationProber {
    fn probe_seconds(&self, path: &Path) -> Result<f64, ProbeError>;
}

impl<F> DurationProber for F
where
    F: Fn(&Path) -> Result<f64, ProbeError>,
{
    fn probe_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        self(path)
    }
}

/// Runs `ffprobe -show_entries format=duration`, bounded by a timeout.
///
/// Owns a current-thread Tokio runtime; each call blocks until ffprobe exits
/// or the timeout elapses, in which case the child is killed.
pub struct FfprobeProber {
    program: PathBuf,
    timeout: Duration,
    runtime: tokio::runtime::Runtime,
}

impl FfprobeProber {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            program: program.into(),
            timeout,
            runtime,
        })
    }
}

impl DurationProber for FfprobeProber {
    fn probe_seconds(&self, path: &Path) -> Result<f64, ProbeError> {
        if !path.exists() {
            return Err(ProbeError::Missing(path.to_path_buf()));
        }

        let output = self.runtime.block_on(async {
            let child = tokio::process::Command::new(&self.program)
                .args(["-v", "error", "-show_entries", "format=duration"])
                .args(["-of", "default=nw=1:nk=1"])
                .arg(path)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output();
            tokio::time::timeout(self.timeout, child).await
        });

        let output = match output {
            Ok(result) => result?,
            Err(_) => return Err(ProbeError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parses ffprobe's bare `format=duration` output (e.g. `"1834.213000\n"`).
pub fn parse_probe_output(stdout: &str) -> Result<f64, ProbeError> {
    let trimmed = stdout.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite())
        .ok_or_else(|| ProbeError::Unparsable(trimmed.to_string()))
}
