use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::settings::ReelSettings;

/// Frame-level schedule of a reel: which image shows on each frame and how far its outgoing
/// transition has progressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReelTimeline {
    image_count: usize,
    fps: Fps,
    total_frames: u64,
    frames_per_image: u64,
    transition_frames: u64,
}

/// What the compositor needs to know about one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameSample {
    pub frame: FrameIndex,
    /// Image whose slot contains this frame.
    pub image_index: usize,
    /// Progress through the trailing transition window, strictly inside `(0, 1)` within the
    /// window and exactly `0` outside it.
    pub transition_progress: f64,
    /// Image being revealed, set only inside a transition window.
    pub next_index: Option<usize>,
}

impl FrameSample {
    pub fn in_transition(&self) -> bool {
        self.next_index.is_some()
    }
}

impl ReelTimeline {
    /// Build the schedule for `image_count` images.
    ///
    /// `frames_per_image = round(spi × fps)` and `total_frames = count × frames_per_image`, so
    /// every image gets a full slot. The transition window is `round(fps × transition_secs)`
    /// frames, capped at one slot. A duration shorter than half a frame yields no frames at all
    /// and is rejected.
    pub fn new(image_count: usize, settings: &ReelSettings, fps: Fps) -> ReelResult<Self> {
        settings.validate()?;
        if image_count == 0 {
            return Err(ReelError::validation("timeline needs at least one image"));
        }
        let spi = settings.seconds_per_image;
        let frames_per_image = fps.secs_to_frames_round(spi);
        if frames_per_image == 0 {
            return Err(ReelError::validation(format!(
                "seconds_per_image {spi} is shorter than one frame at {} fps",
                fps.as_f64()
            )));
        }
        let total_frames = frames_per_image * image_count as u64;
        let transition_frames = fps
            .secs_to_frames_round(settings.transition_secs())
            .min(frames_per_image);

        Ok(Self {
            image_count,
            fps,
            total_frames,
            frames_per_image,
            transition_frames,
        })
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    pub fn frames_per_image(&self) -> u64 {
        self.frames_per_image
    }

    pub fn transition_frames(&self) -> u64 {
        self.transition_frames
    }

    /// Output duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.total_frames)
    }

    /// Schedule entry for `frame`. Frames past the end keep cycling.
    pub fn sample(&self, frame: FrameIndex) -> FrameSample {
        let slot = frame.0 / self.frames_per_image;
        let image_index = (slot % self.image_count as u64) as usize;
        let pos = frame.0 % self.frames_per_image;
        let window_start = self.frames_per_image - self.transition_frames;

        if self.transition_frames == 0 || pos < window_start {
            return FrameSample {
                frame,
                image_index,
                transition_progress: 0.0,
                next_index: None,
            };
        }
        let transition_progress =
            (pos - window_start + 1) as f64 / (self.transition_frames + 1) as f64;
        FrameSample {
            frame,
            image_index,
            transition_progress,
            next_index: Some((image_index + 1) % self.image_count),
        }
    }

    pub fn frames(&self) -> impl Iterator<Item = FrameIndex> {
        (0..self.total_frames).map(FrameIndex)
    }

    /// Integer progress after `frame` has been submitted: `floor(frame / total × 100)`.
    pub fn progress_percent(&self, frame: FrameIndex) -> u8 {
        if self.total_frames == 0 {
            return 0;
        }
        ((frame.0.min(self.total_frames) * 100) / self.total_frames).min(100) as u8
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/timeline.rs"]
mod tests;
