use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use crate::foundation::error::ReelResult;

/// Container of an encoded artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    /// VP9 in WebM.
    WebM,
    /// H.264 in MP4.
    Mp4,
    /// Concatenated raw premultiplied RGBA8 frames.
    RawRgba,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebM => "webm",
            Self::Mp4 => "mp4",
            Self::RawRgba => "rgba",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::WebM => "video/webm",
            Self::Mp4 => "video/mp4",
            Self::RawRgba => "application/octet-stream",
        }
    }
}

/// The one downloadable output of a successful job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReelArtifact {
    pub file_name: String,
    pub container: Container,
    pub bytes: Vec<u8>,
}

impl ReelArtifact {
    /// Name the artifact after `quality_label` and the current time.
    pub fn new(quality_label: &str, container: Container, bytes: Vec<u8>) -> Self {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            file_name: artifact_file_name(quality_label, now_ms, container),
            container,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the artifact into `dir` under its own file name.
    pub fn write_to_dir(&self, dir: &Path) -> ReelResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        Ok(path)
    }
}

/// `quote-reel-{quality}-{timestamp_ms}.{ext}`
pub fn artifact_file_name(quality_label: &str, timestamp_ms: u128, container: Container) -> String {
    format!(
        "quote-reel-{quality_label}-{timestamp_ms}.{}",
        container.extension()
    )
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
