//! Reciprocal-space 3D scene.
//!
//! [`SceneState`] is the authoritative, renderer-agnostic scene: lattice,
//! energy field, wireframe shell, ground grid, lights and one point cloud
//! per resolution shell. [`SceneAnimator`] drives it from two channels: a
//! wall-clock tick and data-driven updates. All geometry and materials are
//! tracked in a [`ResourcePool`] so the GPU mirror can free exactly what the
//! scene released.

mod animator;
pub mod lattice;
pub mod mesh_gen;
pub mod object;
pub mod resources;

use std::sync::Arc;

pub use animator::SceneAnimator;
use glam::{Mat4, Vec3};
pub use lattice::Lattice;
pub use object::{Fog, GeometryHandle, Material, PointLight, Renderable, Transform};
pub use resources::{ResourceId, ResourceKind, ResourcePool};

use crate::camera::{Camera, OrbitPath};
use crate::metrics::ShellSummary;
use crate::options::CameraOptions;
use crate::points::PointCloudData;
use crate::util::ramp::{hex_rgb, Rgb};

/// Energy field sphere radius.
pub const ENERGY_RADIUS: f32 = 12.0;
/// Wireframe shell radius.
pub const WIREFRAME_RADIUS: f32 = 12.5;
/// Ground grid height.
pub const GRID_Y: f32 = -12.0;

const ENERGY_DETAIL: u32 = 3;
const WIREFRAME_DETAIL: u32 = 2;
const GRID_SIZE: f32 = 60.0;
const GRID_DIVISIONS: u32 = 60;

/// One shell's reflections as a drawable point set.
#[derive(Debug, Clone)]
pub struct PointCloud {
    /// Sampled positions and colours.
    pub data: Arc<PointCloudData>,
    /// Pool id of the point buffer.
    pub geometry_id: ResourceId,
    /// Pool id of the point material.
    pub material_id: ResourceId,
    /// Opacity the pulse oscillates around.
    pub base_opacity: f32,
    /// Current opacity.
    pub opacity: f32,
    /// Local transform.
    pub transform: Transform,
}

/// A mesh ready to draw: geometry, material and world matrix.
#[derive(Debug, Clone, Copy)]
pub struct MeshDraw<'a> {
    /// Geometry to bind.
    pub geometry: &'a GeometryHandle,
    /// Material id; stable across data updates.
    pub material_id: ResourceId,
    /// Shading parameters.
    pub material: &'a Material,
    /// Object-to-world matrix.
    pub model: Mat4,
}

/// Everything visible in the 3D view.
#[derive(Debug)]
pub struct SceneState {
    /// Resource ledger for the GPU mirror.
    pub pool: ResourcePool,
    /// Viewing camera.
    pub camera: Camera,
    /// Path the camera follows while playing.
    pub orbit: OrbitPath,
    /// Clear colour.
    pub background: Rgb,
    /// Distance fog.
    pub fog: Fog,
    /// Ambient light colour.
    pub ambient_color: Rgb,
    /// Ambient light intensity.
    pub ambient_intensity: f32,
    /// Key, accent and fill lights.
    pub lights: [PointLight; 3],
    /// Unit-cell lattice.
    pub lattice: Lattice,
    /// Translucent icosphere.
    pub energy_field: Renderable,
    /// Euler angles of the energy field.
    pub energy_angles: Vec3,
    /// Wireframe icosphere.
    pub wireframe: Renderable,
    /// Euler angles of the wireframe.
    pub wireframe_angles: Vec3,
    /// Ground grid.
    pub grid: Renderable,
    /// Whether the grid is drawn.
    pub show_grid: bool,
    /// Current reflection clouds, one per shell.
    pub clouds: Vec<PointCloud>,
    /// Shell averages behind the current appearance; `None` means no data.
    pub summary: Option<ShellSummary>,
    /// Surface size in pixels.
    pub viewport: (u32, u32),
}

impl SceneState {
    /// Build the scene in its creation-time appearance.
    pub fn new(camera: &CameraOptions, width: u32, height: u32) -> Self {
        let mut pool = ResourcePool::new();
        let aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };

        let lattice = Lattice::new(&mut pool);

        let energy_geometry =
            GeometryHandle::new(&mut pool, mesh_gen::icosahedron(ENERGY_RADIUS, ENERGY_DETAIL));
        let energy_field = Renderable::new(&mut pool, energy_geometry, default_energy_material());

        let wire_geometry = GeometryHandle::new(
            &mut pool,
            mesh_gen::icosahedron(WIREFRAME_RADIUS, WIREFRAME_DETAIL).wireframe(),
        );
        let wireframe = Renderable::new(&mut pool, wire_geometry, default_wireframe_material());

        let grid_geometry = GeometryHandle::new(
            &mut pool,
            mesh_gen::grid(
                GRID_SIZE,
                GRID_DIVISIONS,
                hex_rgb(0x00_d9ff),
                hex_rgb(0x00_2244),
            ),
        );
        let mut grid = Renderable::new(&mut pool, grid_geometry, Material::basic(0xff_ffff, 0.06));
        grid.transform.position.y = GRID_Y;

        Self {
            pool,
            camera: Camera::from_options(camera, aspect),
            orbit: OrbitPath::from_options(camera),
            background: DEFAULT_BACKGROUND,
            fog: Fog {
                color: [0.0; 3],
                density: 0.008,
            },
            ambient_color: hex_rgb(0x0a_0a1a),
            ambient_intensity: 0.8,
            lights: default_lights(),
            lattice,
            energy_field,
            energy_angles: Vec3::ZERO,
            wireframe,
            wireframe_angles: Vec3::ZERO,
            grid,
            show_grid: true,
            clouds: Vec::new(),
            summary: None,
            viewport: (width, height),
        }
    }

    /// Every mesh with its world matrix, in draw order: grid, lattice,
    /// wireframe, energy field.
    pub fn meshes(&self) -> impl Iterator<Item = MeshDraw<'_>> {
        let group = self.lattice.transform.matrix();
        let grid = self.show_grid.then_some(&self.grid);
        let lattice = self.lattice.children().map(move |r| draw(r, group));
        grid.into_iter()
            .map(|r| draw(r, Mat4::IDENTITY))
            .chain(lattice)
            .chain(
                [&self.wireframe, &self.energy_field]
                    .into_iter()
                    .map(|r| draw(r, Mat4::IDENTITY)),
            )
    }

    /// Total reflection points currently in the scene.
    #[must_use]
    pub fn point_total(&self) -> usize {
        self.clouds.iter().map(|c| c.data.len()).sum()
    }

    /// Release every resource the scene holds. Leaves the pool empty.
    pub(crate) fn release_all(&mut self) {
        self.release_clouds();
        self.lattice.release(&mut self.pool);
        for r in [&self.energy_field, &self.wireframe, &self.grid] {
            r.release(&mut self.pool, true);
        }
    }

    fn release_clouds(&mut self) {
        for cloud in self.clouds.drain(..) {
            let _ = self.pool.release(cloud.geometry_id);
            let _ = self.pool.release(cloud.material_id);
        }
    }
}

fn draw(r: &Renderable, parent: Mat4) -> MeshDraw<'_> {
    MeshDraw {
        geometry: &r.geometry,
        material_id: r.material_id,
        material: &r.material,
        model: parent * r.transform.matrix(),
    }
}

const DEFAULT_BACKGROUND: Rgb = [0.0; 3];

fn default_energy_material() -> Material {
    Material {
        emissive: hex_rgb(0x00_d9ff),
        emissive_intensity: 0.1,
        double_sided: true,
        ..Material::basic(0x00_d9ff, 0.03)
    }
}

fn default_wireframe_material() -> Material {
    Material::basic(0x00_d9ff, 0.12)
}

fn default_lights() -> [PointLight; 3] {
    [
        PointLight {
            color: hex_rgb(0x00_d9ff),
            intensity: 3.0,
            distance: 150.0,
            position: Vec3::new(15.0, 15.0, 15.0),
        },
        PointLight {
            color: hex_rgb(0xff_00ff),
            intensity: 2.0,
            distance: 100.0,
            position: Vec3::new(-15.0, 10.0, -15.0),
        },
        PointLight {
            color: hex_rgb(0x00_ff88),
            intensity: 2.0,
            distance: 100.0,
            position: Vec3::new(15.0, -10.0, -15.0),
        },
    ]
}
