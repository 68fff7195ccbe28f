//! Configuration module
//!
//! Env-based configuration with a default for every knob, so a bare
//! `Config::from_env()` works out of the box in development.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_VIDEO_DIR: &str = "uploads/videos";
const DEFAULT_THUMBNAIL_DIR: &str = "uploads/thumbnails";
const DEFAULT_PROBE_TOOL: &str = "ffprobe";
/// 500 kbps, a conservative figure for web video. Used when the probe tool
/// cannot give an exact duration.
const DEFAULT_ASSUMED_BITRATE_BPS: u64 = 500 * 1024;
const DEFAULT_FALLBACK_DURATION_SECS: u32 = 60;
const DEFAULT_PROCESSING_DELAY_MS: u64 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    video_dir: PathBuf,
    thumbnail_dir: PathBuf,
    probe_tool: String,
    assumed_bitrate_bps: u64,
    fallback_duration_secs: u32,
    processing_delay_ms: u64,
    max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            server_port: parse_env("KINOTEK_PORT", DEFAULT_SERVER_PORT)?,
            video_dir: path_env("KINOTEK_VIDEO_DIR", DEFAULT_VIDEO_DIR),
            thumbnail_dir: path_env("KINOTEK_THUMBNAIL_DIR", DEFAULT_THUMBNAIL_DIR),
            probe_tool: env::var("KINOTEK_PROBE_TOOL")
                .unwrap_or_else(|_| DEFAULT_PROBE_TOOL.to_string()),
            assumed_bitrate_bps: parse_env(
                "KINOTEK_ASSUMED_BITRATE_BPS",
                DEFAULT_ASSUMED_BITRATE_BPS,
            )?,
            fallback_duration_secs: parse_env(
                "KINOTEK_FALLBACK_DURATION_SECS",
                DEFAULT_FALLBACK_DURATION_SECS,
            )?,
            processing_delay_ms: parse_env(
                "KINOTEK_PROCESSING_DELAY_MS",
                DEFAULT_PROCESSING_DELAY_MS,
            )?,
            max_upload_bytes: parse_env("KINOTEK_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn video_dir(&self) -> &PathBuf {
        &self.video_dir
    }

    pub fn thumbnail_dir(&self) -> &PathBuf {
        &self.thumbnail_dir
    }

    pub fn probe_tool(&self) -> &str {
        &self.probe_tool
    }

    pub fn assumed_bitrate_bps(&self) -> u64 {
        self.assumed_bitrate_bps
    }

    pub fn fallback_duration_secs(&self) -> u32 {
        self.fallback_duration_secs
    }

    /// Simulated encode time before an upload flips to its terminal state.
    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Override the storage directories, for tests and tooling that must not
    /// touch the configured locations.
    pub fn with_storage_dirs(
        mut self,
        video_dir: impl Into<PathBuf>,
        thumbnail_dir: impl Into<PathBuf>,
    ) -> Self {
        self.video_dir = video_dir.into();
        self.thumbnail_dir = thumbnail_dir.into();
        self
    }

    /// Override the probe tool, for tests that must not depend on what is
    /// installed on the host.
    pub fn with_probe_tool(mut self, tool: impl Into<String>) -> Self {
        self.probe_tool = tool.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_SERVER_PORT,
            video_dir: PathBuf::from(DEFAULT_VIDEO_DIR),
            thumbnail_dir: PathBuf::from(DEFAULT_THUMBNAIL_DIR),
            probe_tool: DEFAULT_PROBE_TOOL.to_string(),
            assumed_bitrate_bps: DEFAULT_ASSUMED_BITRATE_BPS,
            fallback_duration_secs: DEFAULT_FALLBACK_DURATION_SECS,
            processing_delay_ms: DEFAULT_PROCESSING_DELAY_MS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn path_env(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::InvalidInput(format!("{key}: {e}"))),
        Err(_) => Ok(default),
    }
}
