use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::encode::artifact::ReelArtifact;
use crate::foundation::error::{ReelError, ReelResult};

/// Lifecycle of one encoding job.
///
/// `Idle → Rendering → Finalizing → Done`, with `Failed` reachable from any non-terminal state
/// and `Cancelled` only from `Rendering`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Rendering,
    Finalizing,
    Done,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    fn can_enter(self, next: Self) -> bool {
        use JobState::*;
        matches!(
            (self, next),
            (Idle, Rendering)
                | (Rendering, Finalizing)
                | (Rendering, Cancelled)
                | (Finalizing, Done)
                | (Idle | Rendering | Finalizing, Failed)
        )
    }
}

/// Terminal result of a job. Cancellation is an outcome, not an error.
#[derive(Debug)]
pub enum JobOutcome {
    Done(ReelArtifact),
    Failed(ReelError),
    /// Stopped on request; `progress_percent` is the value reported last.
    Cancelled { progress_percent: u8 },
}

impl JobOutcome {
    pub fn state(&self) -> JobState {
        match self {
            Self::Done(_) => JobState::Done,
            Self::Failed(_) => JobState::Failed,
            Self::Cancelled { .. } => JobState::Cancelled,
        }
    }

    pub fn artifact(&self) -> Option<&ReelArtifact> {
        match self {
            Self::Done(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_artifact(self) -> ReelResult<ReelArtifact> {
        match self {
            Self::Done(a) => Ok(a),
            Self::Failed(e) => Err(e),
            Self::Cancelled { .. } => Err(ReelError::validation("encoding job was cancelled")),
        }
    }
}

/// One observation of a job's state and progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    pub state: JobState,
    pub percent: u8,
}

/// State machine plus monotonic progress counter for one job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodingJob {
    state: JobState,
    progress: u8,
}

impl Default for EncodingJob {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodingJob {
    pub fn new() -> Self {
        Self {
            state: JobState::Idle,
            progress: 0,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress
    }

    pub fn event(&self) -> ProgressEvent {
        ProgressEvent {
            state: self.state,
            percent: self.progress,
        }
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    pub fn transition(&mut self, next: JobState) -> ReelResult<()> {
        if !self.state.can_enter(next) {
            return Err(ReelError::validation(format!(
                "invalid job transition {:?} -> {next:?}",
                self.state
            )));
        }
        self.state = next;
        if next == JobState::Done {
            self.progress = 100;
        }
        Ok(())
    }

    /// Raise progress to `percent`. Lower values are ignored, and 100 is reserved for `Done`.
    ///
    /// Returns `true` when the stored value changed.
    pub fn advance(&mut self, percent: u8) -> bool {
        let capped = if self.state == JobState::Done {
            100
        } else {
            percent.min(99)
        };
        if capped > self.progress {
            self.progress = capped;
            true
        } else {
            false
        }
    }
}

/// Shared cancellation flag, checked before every frame and during paced waits.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

const CANCEL_POLL: Duration = Duration::from_millis(5);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sleep for `dur`, waking early on cancellation. Returns `true` if cancelled.
    pub fn sleep(&self, dur: Duration) -> bool {
        let deadline = Instant::now() + dur;
        loop {
            if self.is_cancelled() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            std::thread::sleep((deadline - now).min(CANCEL_POLL));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/job.rs"]
mod tests;
