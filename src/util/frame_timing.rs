//! Animation phase and frame-delta sampling.

use web_time::{Duration, Instant};

/// Wall-clock phase and per-step delta for the animation loop, with a
/// smoothed FPS estimate.
#[derive(Debug, Clone)]
pub struct FrameTiming {
    /// Instant the loop was started; phase zero.
    origin: Instant,
    /// Timestamp of the previous step.
    last_frame: Option<Instant>,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

/// One step's timing sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// Seconds since the loop started.
    pub time: f32,
    /// Seconds since the previous step (zero on the first).
    pub dt: f32,
}

impl FrameTiming {
    /// Start timing at `origin`.
    #[must_use]
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            last_frame: None,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Record a step at `now`. Timestamps earlier than the previous step
    /// are treated as zero elapsed time.
    pub fn advance(&mut self, now: Instant) -> FrameSample {
        let elapsed = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(self.last_frame.map_or(now, |last| last.max(now)));

        let dt = elapsed.as_secs_f32();
        if dt > 0.0 {
            let instant_fps = 1.0 / dt;
            self.smoothed_fps =
                self.smoothed_fps * (1.0 - self.smoothing) + instant_fps * self.smoothing;
        }
        FrameSample {
            time: now.saturating_duration_since(self.origin).as_secs_f32(),
            dt,
        }
    }

    /// Get the current FPS (smoothed)
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}
