//! GPU-side layouts for per-frame and per-object parameters.

use crate::scene::{Material, MeshDraw, PointCloud, PointLight, SceneState};

/// One point light, std140/std430 compatible.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// World position.
    pub position: [f32; 3],
    /// Falloff range; zero means unbounded.
    pub distance: f32,
    /// Light colour.
    pub color: [f32; 3],
    /// Intensity multiplier.
    pub intensity: f32,
}

impl From<&PointLight> for LightUniform {
    fn from(light: &PointLight) -> Self {
        Self {
            position: light.position.to_array(),
            distance: light.distance,
            color: light.color,
            intensity: light.intensity,
        }
    }
}

/// Scene-wide lighting and fog.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    /// Ambient colour (rgb) and intensity (w).
    pub ambient: [f32; 4],
    /// Fog colour (rgb) and density (w).
    pub fog: [f32; 4],
    /// The three point lights.
    pub lights: [LightUniform; 3],
}

impl FrameUniform {
    /// Snapshot the scene's lighting.
    #[must_use]
    pub fn from_scene(scene: &SceneState) -> Self {
        let [r, g, b] = scene.ambient_color;
        let [fr, fg, fb] = scene.fog.color;
        Self {
            ambient: [r, g, b, scene.ambient_intensity],
            fog: [fr, fg, fb, scene.fog.density],
            lights: scene.lights.each_ref().map(LightUniform::from),
        }
    }
}

/// Per-object entry of the object table, indexed by instance index.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    /// Object-to-world matrix.
    pub model: [[f32; 4]; 4],
    /// Diffuse colour (rgb) and opacity (a).
    pub color: [f32; 4],
    /// Pre-multiplied emissive colour (rgb); w unused.
    pub emissive: [f32; 4],
    /// x: shininess.
    pub params: [f32; 4],
}

fn scaled([r, g, b]: [f32; 3], k: f32) -> [f32; 4] {
    [r * k, g * k, b * k, 0.0]
}

impl ObjectUniform {
    /// Entry for a mesh.
    #[must_use]
    pub fn mesh(draw: &MeshDraw<'_>) -> Self {
        let Material {
            color,
            emissive,
            emissive_intensity,
            opacity,
            shininess,
            ..
        } = *draw.material;
        let [r, g, b] = color;
        Self {
            model: draw.model.to_cols_array_2d(),
            color: [r, g, b, opacity.clamp(0.0, 1.0)],
            emissive: scaled(emissive, emissive_intensity),
            params: [shininess, 0.0, 0.0, 0.0],
        }
    }

    /// Entry for a point cloud; point colours come from the vertices.
    #[must_use]
    pub fn cloud(cloud: &PointCloud) -> Self {
        Self {
            model: cloud.transform.matrix().to_cols_array_2d(),
            color: [1.0, 1.0, 1.0, cloud.opacity.clamp(0.0, 1.0)],
            emissive: [0.0; 4],
            params: [0.0; 4],
        }
    }
}

/// Object table for the whole scene: clouds first, then meshes in draw
/// order. Index `i` is the instance index used when drawing object `i`.
#[must_use]
pub fn object_table(scene: &SceneState) -> Vec<ObjectUniform> {
    scene
        .clouds
        .iter()
        .map(ObjectUniform::cloud)
        .chain(scene.meshes().map(|m| ObjectUniform::mesh(&m)))
        .collect()
}
