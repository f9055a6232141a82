//! Fixed-cadence frame playback.
//!
//! Advances one frame per interval while playing. Reaching the last frame
//! stops playback on the following interval, leaving the last frame shown.

use web_time::Duration;

use crate::options::PlaybackOptions;

/// The `(frame, playing)` pair the visualization consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    /// 1-based frame number.
    pub current_frame: u32,
    /// Whether playback is running.
    pub is_playing: bool,
}

/// Playback position and timer.
#[derive(Debug, Clone)]
pub struct Playback {
    current_frame: u32,
    total_frames: u32,
    is_playing: bool,
    interval: Duration,
    elapsed: Duration,
}

impl Playback {
    /// Stopped at frame 1 of `total_frames`.
    #[must_use]
    pub fn new(total_frames: u32, options: &PlaybackOptions) -> Self {
        Self {
            current_frame: 1,
            total_frames,
            is_playing: options.autoplay && total_frames > 0,
            interval: Duration::from_millis(options.frame_interval_ms.max(1)),
            elapsed: Duration::ZERO,
        }
    }

    /// Current view state.
    #[must_use]
    pub fn view(&self) -> ViewState {
        ViewState {
            current_frame: self.current_frame,
            is_playing: self.is_playing,
        }
    }

    /// Current 1-based frame.
    #[must_use]
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Number of frames in the dataset.
    #[must_use]
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Whether playback is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Feed wall-clock time. Returns whether the view state changed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.is_playing {
            return false;
        }
        self.elapsed += dt;
        let mut changed = false;
        while self.is_playing && self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            if self.current_frame >= self.total_frames {
                self.is_playing = false;
                self.elapsed = Duration::ZERO;
            } else {
                self.current_frame += 1;
            }
            changed = true;
        }
        changed
    }

    /// Start or pause.
    pub fn toggle(&mut self) {
        self.set_playing(!self.is_playing);
    }

    /// Start or pause explicitly. Starting restarts the interval timer.
    pub fn set_playing(&mut self, playing: bool) {
        if playing && !self.is_playing {
            self.elapsed = Duration::ZERO;
        }
        self.is_playing = playing;
    }

    /// Step back one frame, stopping at 1.
    pub fn step_back(&mut self) -> bool {
        self.seek(self.current_frame.saturating_sub(1))
    }

    /// Step forward one frame, stopping at the last.
    pub fn step_forward(&mut self) -> bool {
        self.seek(self.current_frame.saturating_add(1))
    }

    /// Jump to `frame`, clamped to the dataset. Returns whether the frame
    /// changed.
    pub fn seek(&mut self, frame: u32) -> bool {
        let frame = frame.clamp(1, self.total_frames.max(1));
        let changed = frame != self.current_frame;
        self.current_frame = frame;
        changed
    }

    /// Back to frame 1; the play state is unchanged.
    pub fn reset(&mut self) -> bool {
        self.seek(1)
    }
}
