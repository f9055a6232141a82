use glam::Vec3;

use crate::options::CameraOptions;

/// Circular orbit around the origin with a slow vertical bob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPath {
    radius: f32,
    speed: f32,
    height: f32,
    bob: f32,
    bob_speed: f32,
}

impl OrbitPath {
    /// Orbit parameters from camera options.
    #[must_use]
    pub fn from_options(options: &CameraOptions) -> Self {
        Self {
            radius: options.orbit_radius,
            speed: options.orbit_speed,
            height: options.orbit_height,
            bob: options.orbit_bob,
            bob_speed: options.orbit_bob_speed,
        }
    }

    /// Eye position at wall-clock time `t` seconds.
    #[must_use]
    pub fn eye_at(&self, t: f32) -> Vec3 {
        let (sin_a, cos_a) = (t * self.speed).sin_cos();
        Vec3::new(
            cos_a * self.radius,
            self.height + (t * self.bob_speed).sin() * self.bob,
            sin_a * self.radius,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_on_the_orbit_cylinder() {
        let orbit = OrbitPath::from_options(&CameraOptions::default());
        for i in 0..50 {
            let eye = orbit.eye_at(i as f32 * 0.7);
            let horizontal = (eye.x * eye.x + eye.z * eye.z).sqrt();
            assert!((horizontal - 32.0).abs() < 1e-3);
            assert!((17.0..=23.0).contains(&eye.y));
        }
        assert_eq!(orbit.eye_at(0.0), Vec3::new(32.0, 20.0, 0.0));
    }
}
