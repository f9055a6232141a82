//! Pan/zoom state for the diffraction image view.

use glam::{Affine2, Vec2};

/// Zoom on creation and after reset.
pub const DEFAULT_ZOOM: f32 = 1.5;
/// Smallest zoom.
pub const MIN_ZOOM: f32 = 0.5;
/// Largest zoom.
pub const MAX_ZOOM: f32 = 8.0;
/// Zoom change per wheel pixel.
pub const WHEEL_SENSITIVITY: f32 = -0.001;
/// Zoom change per button press.
pub const ZOOM_STEP: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Idle,
    /// `client - pan` at press time.
    Active { anchor: Vec2 },
}

/// Zoom factor, pan offset and drag state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f32,
    pan: Vec2,
    drag: Drag,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    /// Default zoom, no pan.
    #[must_use]
    pub fn new() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pan: Vec2::ZERO,
            drag: Drag::Idle,
        }
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Current pan offset in pixels.
    #[must_use]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, Drag::Active { .. })
    }

    /// Set zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-finite input is
    /// ignored. Returns whether the zoom changed.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    /// Apply a wheel delta.
    pub fn wheel(&mut self, delta_y: f32) -> bool {
        self.set_zoom(self.zoom + delta_y * WHEEL_SENSITIVITY)
    }

    /// One zoom step in.
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    /// One zoom step out.
    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    /// Begin dragging at `client`.
    pub fn press(&mut self, client: Vec2) {
        self.drag = Drag::Active {
            anchor: client - self.pan,
        };
    }

    /// Move the cursor to `client`; pans only while dragging.
    pub fn drag_to(&mut self, client: Vec2) -> bool {
        match self.drag {
            Drag::Active { anchor } => {
                self.pan = client - anchor;
                true
            }
            Drag::Idle => false,
        }
    }

    /// End any drag (button release or cursor leaving the view).
    pub fn release(&mut self) {
        self.drag = Drag::Idle;
    }

    /// Default zoom and no pan.
    pub fn reset(&mut self) {
        self.zoom = DEFAULT_ZOOM;
        self.pan = Vec2::ZERO;
    }

    /// Image transform: scale about the origin, then translate by the pan.
    #[must_use]
    pub fn transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(Vec2::splat(self.zoom), 0.0, self.pan)
    }

    /// Zoom as a rounded percentage for display.
    #[must_use]
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_zoom_is_clamped() {
        let mut vp = Viewport::new();
        assert!(vp.wheel(-500.0));
        assert!((vp.zoom() - 2.0).abs() < 1e-6);
        let _ = vp.wheel(-1e6);
        assert_eq!(vp.zoom(), MAX_ZOOM);
        assert!(!vp.wheel(-100.0));
        let _ = vp.wheel(1e6);
        assert_eq!(vp.zoom(), MIN_ZOOM);
        assert!(!vp.set_zoom(f32::NAN));
    }

    #[test]
    fn buttons_step_by_half() {
        let mut vp = Viewport::new();
        let _ = vp.zoom_in();
        assert_eq!(vp.zoom(), 2.0);
        for _ in 0..10 {
            let _ = vp.zoom_out();
        }
        assert_eq!(vp.zoom(), MIN_ZOOM);
        assert_eq!(vp.zoom_percent(), 50);
    }

    #[test]
    fn drag_resumes_from_current_pan() {
        let mut vp = Viewport::new();
        vp.press(Vec2::new(100.0, 100.0));
        let _ = vp.drag_to(Vec2::new(150.0, 80.0));
        vp.release();
        assert_eq!(vp.pan(), Vec2::new(50.0, -20.0));
        vp.press(Vec2::new(0.0, 0.0));
        let _ = vp.drag_to(Vec2::new(10.0, 10.0));
        assert_eq!(vp.pan(), Vec2::new(60.0, -10.0));
    }

    #[test]
    fn transform_and_reset() {
        let mut vp = Viewport::new();
        vp.press(Vec2::ZERO);
        let _ = vp.drag_to(Vec2::new(4.0, 2.0));
        let p = vp.transform().transform_point2(Vec2::new(2.0, 2.0));
        assert_eq!(p, Vec2::new(7.0, 5.0));
        vp.reset();
        assert_eq!(vp.zoom(), DEFAULT_ZOOM);
        assert_eq!(vp.pan(), Vec2::ZERO);
        assert_eq!(vp.zoom_percent(), 150);
    }
}
