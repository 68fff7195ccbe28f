//! Video duration probing with graceful degradation.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

/// Estimates how long a video plays, in whole seconds.
///
/// Three tiers, each absorbing the failures of the one above:
/// 1. exact probe via an external tool (ffprobe by default);
/// 2. size-based estimate at an assumed constant bitrate;
/// 3. a fixed sentinel when even the file size is unreadable.
///
/// [`estimate`](DurationProbe::estimate) is total: it always produces a
/// usable value and never surfaces an error to the caller.
pub struct DurationProbe {
    tool_path: String,
    assumed_bitrate_bps: u64,
    fallback_secs: u32,
}

impl DurationProbe {
    pub fn new(
        tool_path: impl Into<String>,
        assumed_bitrate_bps: u64,
        fallback_secs: u32,
    ) -> Self {
        Self {
            tool_path: tool_path.into(),
            assumed_bitrate_bps: assumed_bitrate_bps.max(1),
            fallback_secs,
        }
    }

    /// Estimate the playable length of the file at `path`.
    pub async fn estimate(&self, path: &Path) -> u32 {
        match self.probe_exact(path).await {
            Ok(secs) => {
                tracing::info!(
                    path = %path.display(),
                    duration_secs = secs,
                    "Extracted exact duration"
                );
                return secs;
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Exact duration probe failed, estimating from file size"
                );
            }
        }

        match self.estimate_from_size(path).await {
            Ok(secs) => secs,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    fallback_secs = self.fallback_secs,
                    "Could not read file size, using fallback duration"
                );
                self.fallback_secs
            }
        }
    }

    async fn probe_exact(&self, path: &Path) -> Result<u32> {
        let output = Command::new(&self.tool_path)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .context("failed to execute duration probe")?;

        if !output.status.success() {
            bail!("probe exited with {}", output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        let secs: f64 = text
            .parse()
            .with_context(|| format!("non-numeric probe output: {text:?}"))?;
        if !secs.is_finite() || secs < 0.0 {
            bail!("unusable probe output: {secs}");
        }

        Ok(secs.round().min(u32::MAX as f64) as u32)
    }

    /// Duration from file size at the assumed bitrate, at least 1 second for
    /// any readable file.
    async fn estimate_from_size(&self, path: &Path) -> std::io::Result<u32> {
        let size_bytes = tokio::fs::metadata(path).await?.len();
        let estimated = (size_bytes.saturating_mul(8) / self.assumed_bitrate_bps)
            .min(u64::from(u32::MAX)) as u32;
        let estimated = estimated.max(1);

        tracing::info!(
            path = %path.display(),
            size_bytes,
            estimated_secs = estimated,
            "Estimated duration from file size"
        );

        Ok(estimated)
    }
}
