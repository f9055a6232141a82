//! Perspective camera and the idle orbit it follows while playing.

/// Core camera struct and GPU uniform types.
pub mod core;
/// Time-parameterised orbit around the origin.
pub mod orbit;

pub use self::core::{Camera, CameraUniform};
pub use orbit::OrbitPath;
