//! Shared utilities: colour ramps and frame timing.

pub mod frame_timing;
pub mod ramp;
