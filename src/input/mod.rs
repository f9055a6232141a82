//! Input handling: platform-agnostic events and the processor that routes
//! them to the viewport or turns key presses into viewer commands.

/// Platform-agnostic input events.
pub mod event;
/// Routes events to the viewport and key presses to commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use processor::{InputProcessor, KeyBindings, ViewerCommand};
