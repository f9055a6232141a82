//! Unit-cell lattice: the 12 edges of a cube as thin cylinders, with a small
//! sphere at each edge's start corner.

use glam::{Quat, Vec3};

use super::mesh_gen;
use super::object::{GeometryHandle, Material, Renderable, Transform};
use super::resources::ResourcePool;

/// Cube edge length.
pub const CELL_SIZE: f32 = 14.0;
/// Edge cylinder radius.
pub const EDGE_RADIUS: f32 = 0.05;
/// Corner sphere radius.
pub const NODE_RADIUS: f32 = 0.12;

const EDGE_SEGMENTS: u32 = 6;
const NODE_SEGMENTS: u32 = 12;

/// Edge cylinder colour / emissive.
pub const EDGE_COLOR: u32 = 0x00_d9ff;
/// Corner sphere colour / emissive.
pub const NODE_COLOR: u32 = 0x00_ffff;

/// Emissive intensity, opacity of edges at creation.
pub const EDGE_DEFAULTS: (f32, f32) = (0.15, 0.25);
/// Emissive intensity, opacity of nodes at creation.
pub const NODE_DEFAULTS: (f32, f32) = (0.2, 0.3);

/// Corner-index pairs of the 12 cube edges, corners encoded as xyz bits.
const EDGES: [(u8, u8); 12] = [
    (0b000, 0b100),
    (0b000, 0b010),
    (0b000, 0b001),
    (0b100, 0b110),
    (0b100, 0b101),
    (0b010, 0b110),
    (0b010, 0b011),
    (0b001, 0b101),
    (0b001, 0b011),
    (0b110, 0b111),
    (0b101, 0b111),
    (0b011, 0b111),
];

fn corner(bits: u8) -> Vec3 {
    let axis = |mask: u8| if bits & mask != 0 { CELL_SIZE } else { 0.0 };
    Vec3::new(axis(0b100), axis(0b010), axis(0b001)) - Vec3::splat(CELL_SIZE / 2.0)
}

/// Lattice group: a shared transform over edges and nodes.
#[derive(Debug, Clone)]
pub struct Lattice {
    /// Group transform applied on top of each child's.
    pub transform: Transform,
    /// Euler angles driving `transform`.
    pub angles: Vec3,
    /// Edge cylinders.
    pub edges: Vec<Renderable>,
    /// Corner spheres, one per edge.
    pub nodes: Vec<Renderable>,
    edge_geometry: GeometryHandle,
    node_geometry: GeometryHandle,
}

impl Lattice {
    /// Build the lattice, registering its resources with `pool`.
    pub fn new(pool: &mut ResourcePool) -> Self {
        let edge_geometry = GeometryHandle::new(
            pool,
            mesh_gen::cylinder(EDGE_RADIUS, CELL_SIZE, EDGE_SEGMENTS),
        );
        let node_geometry = GeometryHandle::new(
            pool,
            mesh_gen::uv_sphere(NODE_RADIUS, NODE_SEGMENTS, NODE_SEGMENTS),
        );

        let mut edges = Vec::with_capacity(EDGES.len());
        let mut nodes = Vec::with_capacity(EDGES.len());
        for (a, b) in EDGES {
            let (start, end) = (corner(a), corner(b));
            let dir = end - start;

            let mut edge = Renderable::new(pool, edge_geometry.clone(), edge_material());
            edge.transform.position = start + dir * 0.5;
            edge.transform.rotation = Quat::from_rotation_arc(Vec3::Y, dir.normalize());
            edges.push(edge);

            let mut node = Renderable::new(pool, node_geometry.clone(), node_material());
            node.transform.position = start;
            nodes.push(node);
        }

        Self {
            transform: Transform::default(),
            angles: Vec3::ZERO,
            edges,
            nodes,
            edge_geometry,
            node_geometry,
        }
    }

    /// Drive edges and nodes from normalised intensity and completeness.
    pub fn apply(&mut self, intensity: f32, completeness: f32) {
        for edge in &mut self.edges {
            edge.material.emissive_intensity = EDGE_DEFAULTS.0 + intensity * 0.2;
            edge.material.opacity = 0.2 + completeness * 0.15;
        }
        let scale = 0.5 + intensity * 0.3;
        for node in &mut self.nodes {
            node.material.emissive_intensity = NODE_DEFAULTS.0 + intensity * 0.25;
            node.transform.scale = Vec3::splat(scale);
        }
    }

    /// Restore creation-time appearance.
    pub fn reset(&mut self) {
        let edge = edge_material();
        let node = node_material();
        for e in &mut self.edges {
            e.material = edge;
        }
        for n in &mut self.nodes {
            n.material = node;
            n.transform.scale = Vec3::ONE;
        }
    }

    /// All children with their world transforms.
    pub fn children(&self) -> impl Iterator<Item = &Renderable> {
        self.edges.iter().chain(&self.nodes)
    }

    /// Release the two shared geometries and every material.
    pub fn release(&self, pool: &mut ResourcePool) {
        for child in self.children() {
            child.release(pool, false);
        }
        let _ = pool.release(self.edge_geometry.id);
        let _ = pool.release(self.node_geometry.id);
    }
}

fn edge_material() -> Material {
    Material {
        shininess: 100.0,
        ..Material::glowing(EDGE_COLOR, EDGE_DEFAULTS.0, EDGE_DEFAULTS.1)
    }
}

fn node_material() -> Material {
    Material::glowing(NODE_COLOR, NODE_DEFAULTS.0, NODE_DEFAULTS.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::resources::ResourceKind;

    #[test]
    fn twelve_unit_length_edges_on_the_cube() {
        let mut pool = ResourcePool::new();
        let lattice = Lattice::new(&mut pool);
        assert_eq!(lattice.edges.len(), 12);
        assert_eq!(lattice.nodes.len(), 12);
        for edge in &lattice.edges {
            let m = edge.transform.matrix();
            let a = m.transform_point3(Vec3::new(0.0, -7.0, 0.0));
            let b = m.transform_point3(Vec3::new(0.0, 7.0, 0.0));
            assert!(((a - b).length() - CELL_SIZE).abs() < 1e-4);
            for p in [a, b] {
                assert!(p.abs().max_element() <= 7.0 + 1e-4);
            }
        }
        assert_eq!(pool.live_of(ResourceKind::Geometry), 2);
        assert_eq!(pool.live_of(ResourceKind::Material), 24);
    }

    #[test]
    fn apply_then_reset() {
        let mut pool = ResourcePool::new();
        let mut lattice = Lattice::new(&mut pool);
        lattice.apply(1.0, 1.0);
        assert!((lattice.edges[0].material.emissive_intensity - 0.35).abs() < 1e-6);
        assert!((lattice.edges[0].material.opacity - 0.35).abs() < 1e-6);
        assert_eq!(lattice.nodes[3].transform.scale, Vec3::splat(0.8));
        lattice.reset();
        assert_eq!(lattice.edges[0].material.opacity, 0.25);
        assert_eq!(lattice.nodes[3].transform.scale, Vec3::ONE);
    }

    #[test]
    fn release_frees_everything() {
        let mut pool = ResourcePool::new();
        let lattice = Lattice::new(&mut pool);
        lattice.release(&mut pool);
        assert_eq!(pool.live_count(), 0);
    }
}
