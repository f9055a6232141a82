//! Converts raw platform events into viewer commands.
//!
//! Pointer events go straight to the [`Viewport`]; key presses are looked
//! up in a [`KeyBindings`] map and returned as [`ViewerCommand`]s for the
//! caller to apply to playback or the view.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::event::{InputEvent, MouseButton};
use crate::viewport::Viewport;

/// Discrete viewer actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerCommand {
    /// Start or pause playback.
    TogglePlay,
    /// Step one frame back.
    PreviousFrame,
    /// Step one frame forward.
    NextFrame,
    /// Rewind playback to frame 1.
    ResetPlayback,
    /// Zoom the diffraction view in by one step.
    ZoomIn,
    /// Zoom the diffraction view out by one step.
    ZoomOut,
    /// Restore default zoom and pan.
    ResetView,
}

/// Maps physical key strings to [`ViewerCommand`]s.
///
/// Key strings use the `winit::keyboard::KeyCode` debug format:
/// `"Space"`, `"ArrowLeft"`, `"KeyR"`, etc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    bindings: HashMap<String, ViewerCommand>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = HashMap::from([
            ("Space".into(), ViewerCommand::TogglePlay),
            ("ArrowLeft".into(), ViewerCommand::PreviousFrame),
            ("ArrowRight".into(), ViewerCommand::NextFrame),
            ("KeyR".into(), ViewerCommand::ResetPlayback),
            ("Equal".into(), ViewerCommand::ZoomIn),
            ("Minus".into(), ViewerCommand::ZoomOut),
            ("Digit0".into(), ViewerCommand::ResetView),
        ]);
        Self { bindings }
    }
}

impl KeyBindings {
    /// Look up the command for a physical key string.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<ViewerCommand> {
        self.bindings.get(key).copied()
    }
}

/// Tracks the cursor and routes events.
#[derive(Debug, Default)]
pub struct InputProcessor {
    cursor: Vec2,
    key_bindings: KeyBindings,
}

impl InputProcessor {
    /// Processor with the default key map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor with a custom key map.
    #[must_use]
    pub fn with_bindings(key_bindings: KeyBindings) -> Self {
        Self {
            cursor: Vec2::ZERO,
            key_bindings,
        }
    }

    /// Last known cursor position.
    #[must_use]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Apply a pointer event to `viewport`. Returns whether the view changed.
    pub fn handle_event(&mut self, event: InputEvent, viewport: &mut Viewport) -> bool {
        match event {
            InputEvent::CursorMoved { x, y } => {
                self.cursor = Vec2::new(x, y);
                viewport.drag_to(self.cursor)
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            } => {
                viewport.press(self.cursor);
                false
            }
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: false,
            }
            | InputEvent::CursorLeft => {
                viewport.release();
                false
            }
            InputEvent::MouseButton { .. } => false,
            InputEvent::Scroll { delta_y } => viewport.wheel(delta_y),
        }
    }

    /// Look up a key press.
    #[must_use]
    pub fn handle_key_press(&self, key: &str) -> Option<ViewerCommand> {
        self.key_bindings.lookup(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_pans_the_viewport() {
        let mut input = InputProcessor::new();
        let mut vp = Viewport::new();
        let _ = input.handle_event(InputEvent::CursorMoved { x: 10.0, y: 10.0 }, &mut vp);
        let _ = input.handle_event(
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            },
            &mut vp,
        );
        assert!(input.handle_event(InputEvent::CursorMoved { x: 30.0, y: 5.0 }, &mut vp));
        assert_eq!(vp.pan(), Vec2::new(20.0, -5.0));
        let _ = input.handle_event(InputEvent::CursorLeft, &mut vp);
        assert!(!input.handle_event(InputEvent::CursorMoved { x: 90.0, y: 90.0 }, &mut vp));
        assert_eq!(vp.pan(), Vec2::new(20.0, -5.0));
    }

    #[test]
    fn right_button_does_not_drag() {
        let mut input = InputProcessor::new();
        let mut vp = Viewport::new();
        let _ = input.handle_event(
            InputEvent::MouseButton {
                button: MouseButton::Right,
                pressed: true,
            },
            &mut vp,
        );
        assert!(!vp.is_dragging());
    }

    #[test]
    fn default_keys() {
        let input = InputProcessor::new();
        assert_eq!(input.handle_key_press("Space"), Some(ViewerCommand::TogglePlay));
        assert_eq!(input.handle_key_press("ArrowRight"), Some(ViewerCommand::NextFrame));
        assert_eq!(input.handle_key_press("KeyQ"), None);
    }

    #[test]
    fn bindings_from_toml() {
        let bindings: KeyBindings =
            toml::from_str("[bindings]\nKeyP = \"toggle_play\"\n").unwrap();
        let input = InputProcessor::with_bindings(bindings);
        assert_eq!(input.handle_key_press("KeyP"), Some(ViewerCommand::TogglePlay));
        assert_eq!(input.handle_key_press("Space"), None);
    }
}
