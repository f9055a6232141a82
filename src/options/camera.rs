use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Reciprocal-space camera projection and orbit parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
    /// Camera position before the first orbit step.
    #[schemars(skip)]
    pub start_position: [f32; 3],
    /// Horizontal orbit radius while playing.
    #[schemars(title = "Orbit Radius", range(min = 10.0, max = 80.0), extend("step" = 1.0))]
    pub orbit_radius: f32,
    /// Orbit angular rate in radians per second.
    #[schemars(title = "Orbit Speed", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub orbit_speed: f32,
    /// Resting camera height while orbiting.
    #[schemars(skip)]
    pub orbit_height: f32,
    /// Amplitude of the vertical bob while orbiting.
    #[schemars(skip)]
    pub orbit_bob: f32,
    /// Angular rate of the vertical bob in radians per second.
    #[schemars(skip)]
    pub orbit_bob_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 50.0,
            znear: 0.1,
            zfar: 1000.0,
            start_position: [25.0, 18.0, 25.0],
            orbit_radius: 32.0,
            orbit_speed: 0.12,
            orbit_height: 20.0,
            orbit_bob: 3.0,
            orbit_bob_speed: 0.08,
        }
    }
}
