use glam::{Mat4, Vec3};

use crate::options::CameraOptions;

/// Perspective camera defined by eye position, target, and projection
/// parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Camera {
    /// Camera at the configured start position looking at the origin.
    #[must_use]
    pub fn from_options(options: &CameraOptions, aspect: f32) -> Self {
        Self {
            eye: Vec3::from_array(options.start_position),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: sanitize_aspect(aspect),
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        }
    }

    /// Update the aspect ratio from a surface size. Zero-sized surfaces
    /// keep the previous value.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Build the combined view-projection matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target, self.up);
        // perspective_rh already uses [0,1] depth range (wgpu convention)
        let proj = Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
        proj * view
    }

    /// Unit vector from the eye toward the target.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or(Vec3::NEG_Z)
    }

    /// Camera right vector, used to expand point billboards.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
/// GPU uniform holding the view-projection matrix and the camera basis.
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Viewport aspect ratio.
    pub aspect: f32,
    /// Camera right vector.
    pub right: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Camera up vector (orthogonalised).
    pub up: [f32; 3],
    /// Surface height in pixels, for point sizing.
    pub viewport_height: f32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Create a new camera uniform with identity view-projection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            aspect: 1.0,
            right: [1.0, 0.0, 0.0],
            fovy: 50.0,
            up: [0.0, 1.0, 0.0],
            viewport_height: 1.0,
        }
    }

    /// Update uniform fields from the given camera's current state.
    pub fn update(&mut self, camera: &Camera, viewport_height: u32) {
        self.view_proj = camera.build_matrix().to_cols_array_2d();
        self.position = camera.eye.to_array();
        self.aspect = camera.aspect;
        let right = camera.right();
        self.right = right.to_array();
        self.up = right.cross(camera.forward()).to_array();
        self.fovy = camera.fovy;
        self.viewport_height = viewport_height.max(1) as f32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = Camera::from_options(&CameraOptions::default(), 1.5);
        let clip = cam.build_matrix() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn zero_viewport_keeps_aspect() {
        let mut cam = Camera::from_options(&CameraOptions::default(), 0.0);
        assert_eq!(cam.aspect, 1.0);
        cam.set_viewport(800, 400);
        assert_eq!(cam.aspect, 2.0);
        cam.set_viewport(0, 400);
        assert_eq!(cam.aspect, 2.0);
    }

    #[test]
    fn uniform_basis_is_orthonormal() {
        let cam = Camera::from_options(&CameraOptions::default(), 1.0);
        let mut u = CameraUniform::new();
        u.update(&cam, 600);
        let r = Vec3::from_array(u.right);
        let up = Vec3::from_array(u.up);
        assert!(r.dot(up).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-4);
        assert_eq!(u.viewport_height, 600.0);
    }
}
