use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Reflections", inline)]
#[serde(default)]
/// Sampling constants for the per-shell reflection point clouds.
pub struct PointOptions {
    /// Reflections represented by one drawn point.
    #[schemars(title = "Density Divisor", range(min = 1, max = 20))]
    pub density_divisor: u32,
    /// Maximum points per shell.
    #[schemars(title = "Point Cap", range(min = 100, max = 20000))]
    pub max_points: u32,
    /// Sphere radius of the innermost shell.
    #[schemars(skip)]
    pub base_radius: f32,
    /// Radius added per shell index.
    #[schemars(title = "Shell Spacing", range(min = 0.5, max = 6.0), extend("step" = 0.1))]
    pub shell_spacing: f32,
    /// I/σ that maps to the top of the reflection colour ramp.
    #[schemars(skip)]
    pub i_over_sigma_ceiling: f32,
    /// Point size at zero I/σ.
    #[schemars(skip)]
    pub base_size: f32,
    /// Point size added per 30 units of I/σ.
    #[schemars(skip)]
    pub size_gain: f32,
}

impl Default for PointOptions {
    fn default() -> Self {
        Self {
            density_divisor: 3,
            max_points: 3000,
            base_radius: 6.0,
            shell_spacing: 2.5,
            i_over_sigma_ceiling: 35.0,
            base_size: 1.6,
            size_gain: 0.8,
        }
    }
}
