//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order and hand back a single [`ReelArtifact`].
//!
//! [`ReelArtifact`]: artifact::ReelArtifact

/// Encoded output and its naming.
pub mod artifact;
/// `ffmpeg`-based sinks (WebM/VP9 or MP4/H.264 via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
