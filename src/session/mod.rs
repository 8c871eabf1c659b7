//! Job orchestration: the encoding pipeline, its state machine, and the preview timer.

/// Job lifecycle, outcomes and cancellation.
pub mod job;
/// Frame loop from image snapshot to encoded artifact.
pub mod pipeline;
/// Repeating preview timer.
pub mod preview;
