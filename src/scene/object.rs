//! Scene graph leaves: transforms, materials and drawable meshes.

use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::mesh_gen::MeshData;
use super::resources::{ResourceId, ResourceKind, ResourcePool};
use crate::util::ramp::{hex_rgb, Rgb};

/// Translation, rotation and scale of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Orientation.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Set orientation from XYZ Euler angles in radians.
    pub fn set_euler(&mut self, angles: Vec3) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, angles.x, angles.y, angles.z);
    }

    /// Local-to-parent matrix.
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Phong-style material parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse colour.
    pub color: Rgb,
    /// Emissive colour.
    pub emissive: Rgb,
    /// Multiplier on `emissive`.
    pub emissive_intensity: f32,
    /// Alpha in `[0, 1]`.
    pub opacity: f32,
    /// Specular exponent.
    pub shininess: f32,
    /// Render back faces too.
    pub double_sided: bool,
}

impl Material {
    /// Non-emissive material of colour `hex` with the given opacity.
    #[must_use]
    pub fn basic(hex: u32, opacity: f32) -> Self {
        Self {
            color: hex_rgb(hex),
            emissive: [0.0; 3],
            emissive_intensity: 0.0,
            opacity,
            shininess: 30.0,
            double_sided: false,
        }
    }

    /// Material that glows in its own colour.
    #[must_use]
    pub fn glowing(hex: u32, emissive_intensity: f32, opacity: f32) -> Self {
        Self {
            emissive: hex_rgb(hex),
            emissive_intensity,
            ..Self::basic(hex, opacity)
        }
    }
}

/// Shared, immutable geometry with its pool id.
#[derive(Debug, Clone)]
pub struct GeometryHandle {
    /// Pool id.
    pub id: ResourceId,
    /// Vertex data.
    pub mesh: Arc<MeshData>,
}

impl GeometryHandle {
    /// Register `mesh` with the pool.
    pub fn new(pool: &mut ResourcePool, mesh: MeshData) -> Self {
        Self {
            id: pool.acquire(ResourceKind::Geometry),
            mesh: Arc::new(mesh),
        }
    }
}

/// A mesh drawn with its own material.
#[derive(Debug, Clone)]
pub struct Renderable {
    /// Geometry, possibly shared with other renderables.
    pub geometry: GeometryHandle,
    /// Pool id of this renderable's material.
    pub material_id: ResourceId,
    /// Current material parameters.
    pub material: Material,
    /// Local transform.
    pub transform: Transform,
}

impl Renderable {
    /// Wrap `geometry` with a freshly acquired material.
    pub fn new(pool: &mut ResourcePool, geometry: GeometryHandle, material: Material) -> Self {
        Self {
            geometry,
            material_id: pool.acquire(ResourceKind::Material),
            material,
            transform: Transform::default(),
        }
    }

    /// Release the material and, when `owns_geometry`, the geometry too.
    pub fn release(&self, pool: &mut ResourcePool, owns_geometry: bool) {
        let _ = pool.release(self.material_id);
        if owns_geometry {
            let _ = pool.release(self.geometry.id);
        }
    }
}

/// Omnidirectional light with linear falloff to `distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Light colour.
    pub color: Rgb,
    /// Current intensity.
    pub intensity: f32,
    /// Range; zero means unbounded.
    pub distance: f32,
    /// World position.
    pub position: Vec3,
}

/// Exponential-squared fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Fog colour.
    pub color: Rgb,
    /// Density coefficient.
    pub density: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh_gen;

    #[test]
    fn euler_then_matrix() {
        let mut t = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            ..Transform::default()
        };
        t.set_euler(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 2.0)).length() < 1e-5);
    }

    #[test]
    fn shared_geometry_released_by_owner_only() {
        let mut pool = ResourcePool::new();
        pool.attach_mirror();
        let geo = GeometryHandle::new(&mut pool, mesh_gen::uv_sphere(1.0, 8, 8));
        let a = Renderable::new(&mut pool, geo.clone(), Material::basic(0xffffff, 1.0));
        let b = Renderable::new(&mut pool, geo, Material::basic(0xffffff, 1.0));
        a.release(&mut pool, false);
        b.release(&mut pool, true);
        assert_eq!(pool.live_count(), 0);
        assert_eq!(pool.drain_released().len(), 3);
    }
}
