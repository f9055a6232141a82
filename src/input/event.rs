/// Platform-agnostic pointer events.
///
/// These are fed into an [`InputProcessor`](super::InputProcessor), which
/// drives the [`Viewport`](crate::viewport::Viewport) pan/zoom state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to absolute client position.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Wheel movement in pixels, browser sign convention (positive =
    /// scroll down = zoom out).
    Scroll {
        /// Vertical wheel delta.
        delta_y: f32,
    },
    /// Cursor left the view.
    CursorLeft,
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Left,
        }
    }
}

/// Pixels per wheel "line" when the platform reports line deltas.
#[cfg(feature = "viewer")]
const LINE_HEIGHT: f32 = 100.0;

#[cfg(feature = "viewer")]
impl InputEvent {
    /// Translate a winit window event, if it is one the viewport handles.
    #[must_use]
    pub fn from_window_event(event: &winit::event::WindowEvent) -> Option<Self> {
        use winit::event::{ElementState, MouseScrollDelta, WindowEvent};

        match event {
            WindowEvent::CursorMoved { position, .. } => Some(Self::CursorMoved {
                x: position.x as f32,
                y: position.y as f32,
            }),
            WindowEvent::MouseInput { state, button, .. } => Some(Self::MouseButton {
                button: (*button).into(),
                pressed: *state == ElementState::Pressed,
            }),
            WindowEvent::MouseWheel { delta, .. } => {
                // winit reports "up" as positive; the browser convention is
                // the opposite
                let delta_y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
                };
                Some(Self::Scroll { delta_y })
            }
            WindowEvent::CursorLeft { .. } => Some(Self::CursorLeft),
            _ => None,
        }
    }
}
