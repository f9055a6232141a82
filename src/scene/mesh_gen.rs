//! Procedural geometry for the reciprocal-space scene.
//!
//! All generators produce CPU-side [`MeshData`]; uploading is the GPU
//! mirror's job.

use std::f32::consts::{PI, TAU};

use glam::{IVec3, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::util::ramp::Rgb;

/// How indices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// Every three indices form a triangle.
    Triangles,
    /// Every two indices form a segment.
    Lines,
}

/// Indexed vertex data.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals (same length as `positions`).
    pub normals: Vec<Vec3>,
    /// Optional per-vertex colours; empty when the material colour applies.
    pub colors: Vec<Rgb>,
    /// Primitive indices.
    pub indices: Vec<u32>,
    /// Primitive assembly.
    pub topology: Topology,
}

impl MeshData {
    /// Number of primitives.
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::Triangles => self.indices.len() / 3,
            Topology::Lines => self.indices.len() / 2,
        }
    }

    /// Unique undirected edges of a triangle mesh as a line mesh. Used to
    /// draw a surface as wireframe.
    ///
    /// Edges are identified by endpoint position, not index, so faces that
    /// carry their own copies of a shared edge still draw it once.
    #[must_use]
    pub fn wireframe(&self) -> Self {
        let canon = weld(&self.positions);
        let mut seen: FxHashSet<(u32, u32)> = FxHashSet::default();
        let mut indices = Vec::with_capacity(self.indices.len() * 2);
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let (ca, cb) = (canon[a as usize], canon[b as usize]);
                if ca != cb && seen.insert((ca.min(cb), ca.max(cb))) {
                    indices.extend_from_slice(&[a, b]);
                }
            }
        }
        Self {
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            colors: self.colors.clone(),
            indices,
            topology: Topology::Lines,
        }
    }
}

/// Positions closer than this are the same vertex.
const WELD_EPSILON: f32 = 1e-4;

/// Map each position to the index of the first position within
/// [`WELD_EPSILON`] of it.
fn weld(positions: &[Vec3]) -> Vec<u32> {
    let cell = |p: Vec3| (p / WELD_EPSILON).floor().as_ivec3();
    let mut buckets: FxHashMap<IVec3, Vec<u32>> = FxHashMap::default();
    let mut canon = Vec::with_capacity(positions.len());
    for (i, &p) in positions.iter().enumerate() {
        let home = cell(p);
        let mut found = None;
        'search: for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = home + IVec3::new(dx, dy, dz);
                    if let Some(bucket) = buckets.get(&key) {
                        if let Some(&j) = bucket
                            .iter()
                            .find(|&&j| positions[j as usize].distance(p) <= WELD_EPSILON)
                        {
                            found = Some(j);
                            break 'search;
                        }
                    }
                }
            }
        }
        let id = found.unwrap_or_else(|| {
            buckets.entry(home).or_default().push(i as u32);
            i as u32
        });
        canon.push(id);
    }
    canon
}

/// Capped cylinder along +Y, centred at the origin.
#[must_use]
pub fn cylinder(radius: f32, height: f32, radial_segments: u32) -> MeshData {
    let segments = radial_segments.max(3);
    let half = height * 0.5;
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();

    for i in 0..segments {
        let angle = (i as f32 / segments as f32) * TAU;
        let (sin_a, cos_a) = angle.sin_cos();
        let normal = Vec3::new(cos_a, 0.0, sin_a);
        positions.push(Vec3::new(radius * cos_a, -half, radius * sin_a));
        normals.push(normal);
        positions.push(Vec3::new(radius * cos_a, half, radius * sin_a));
        normals.push(normal);
    }
    for i in 0..segments {
        let next = (i + 1) % segments;
        let (b0, t0) = (i * 2, i * 2 + 1);
        let (b1, t1) = (next * 2, next * 2 + 1);
        indices.extend_from_slice(&[b0, b1, t0, t0, b1, t1]);
    }

    // caps: centre vertex plus a ring with the cap normal
    for (y, ny) in [(-half, -1.0), (half, 1.0)] {
        let centre = positions.len() as u32;
        positions.push(Vec3::new(0.0, y, 0.0));
        normals.push(Vec3::new(0.0, ny, 0.0));
        for i in 0..segments {
            let angle = (i as f32 / segments as f32) * TAU;
            positions.push(Vec3::new(radius * angle.cos(), y, radius * angle.sin()));
            normals.push(Vec3::new(0.0, ny, 0.0));
        }
        for i in 0..segments {
            let a = centre + 1 + i;
            let b = centre + 1 + (i + 1) % segments;
            if ny > 0.0 {
                indices.extend_from_slice(&[centre, b, a]);
            } else {
                indices.extend_from_slice(&[centre, a, b]);
            }
        }
    }

    MeshData {
        positions,
        normals,
        colors: Vec::new(),
        indices,
        topology: Topology::Triangles,
    }
}

/// Latitude/longitude sphere.
#[must_use]
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let ws = width_segments.max(3);
    let hs = height_segments.max(2);
    let mut positions = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut indices = Vec::new();

    for y in 0..=hs {
        let v = y as f32 / hs as f32;
        let (sin_t, cos_t) = (v * PI).sin_cos();
        for x in 0..=ws {
            let u = x as f32 / ws as f32;
            let (sin_p, cos_p) = (u * TAU).sin_cos();
            let n = Vec3::new(-cos_p * sin_t, cos_t, sin_p * sin_t);
            positions.push(n * radius);
            normals.push(n);
        }
    }
    let row = ws + 1;
    for y in 0..hs {
        for x in 0..ws {
            let a = y * row + x + 1;
            let b = y * row + x;
            let c = (y + 1) * row + x;
            let d = (y + 1) * row + x + 1;
            if y != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if y != hs - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    MeshData {
        positions,
        normals,
        colors: Vec::new(),
        indices,
        topology: Topology::Triangles,
    }
}

/// Icosahedron with each face split into `(detail + 1)²` triangles, all
/// vertices pushed out to `radius`.
///
/// Detail `0` is the plain 20-face solid. Faces do not share vertices; a
/// vertex on a base edge appears once per adjacent face, with the same
/// position and normal.
#[must_use]
pub fn icosahedron(radius: f32, detail: u32) -> MeshData {
    let phi = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let corners = [
        Vec3::new(-1.0, phi, 0.0),
        Vec3::new(1.0, phi, 0.0),
        Vec3::new(-1.0, -phi, 0.0),
        Vec3::new(1.0, -phi, 0.0),
        Vec3::new(0.0, -1.0, phi),
        Vec3::new(0.0, 1.0, phi),
        Vec3::new(0.0, -1.0, -phi),
        Vec3::new(0.0, 1.0, -phi),
        Vec3::new(phi, 0.0, -1.0),
        Vec3::new(phi, 0.0, 1.0),
        Vec3::new(-phi, 0.0, -1.0),
        Vec3::new(-phi, 0.0, 1.0),
    ];
    #[rustfmt::skip]
    let faces: [[usize; 3]; 20] = [
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    let n = detail + 1;
    let per_face = ((n + 1) * (n + 2) / 2) as usize;
    let mut positions = Vec::with_capacity(per_face * faces.len());
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut indices = Vec::new();

    for face in faces {
        let [a, b, c] = face.map(|i| corners[i]);
        let base = positions.len() as u32;
        // row i holds n - i + 1 vertices, from edge a→b towards c
        let mut row_start = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            row_start.push(positions.len() as u32 - base);
            for j in 0..=(n - i) {
                let p = a
                    + (b - a) * (j as f32 / n as f32)
                    + (c - a) * (i as f32 / n as f32);
                let dir = p.normalize();
                positions.push(dir * radius);
                normals.push(dir);
            }
        }
        for i in 0..n {
            let lo = base + row_start[i as usize];
            let hi = base + row_start[i as usize + 1];
            for j in 0..(n - i) {
                indices.extend_from_slice(&[lo + j, lo + j + 1, hi + j]);
                if j + 1 < n - i {
                    indices.extend_from_slice(&[lo + j + 1, hi + j + 1, hi + j]);
                }
            }
        }
    }

    MeshData {
        positions,
        normals,
        colors: Vec::new(),
        indices,
        topology: Topology::Triangles,
    }
}

/// Square line grid on the XZ plane, `size` wide with `divisions` cells per
/// side. The two centre lines use `center_color`, the rest `line_color`.
#[must_use]
pub fn grid(size: f32, divisions: u32, center_color: Rgb, line_color: Rgb) -> MeshData {
    let divisions = divisions.max(1);
    let half = size / 2.0;
    let step = size / divisions as f32;
    let centre = divisions / 2;
    let mut positions = Vec::new();
    let mut colors = Vec::new();

    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == centre && divisions % 2 == 0 {
            center_color
        } else {
            line_color
        };
        positions.extend_from_slice(&[
            Vec3::new(-half, 0.0, k),
            Vec3::new(half, 0.0, k),
            Vec3::new(k, 0.0, -half),
            Vec3::new(k, 0.0, half),
        ]);
        colors.extend_from_slice(&[color; 4]);
    }
    let indices = (0..positions.len() as u32).collect();

    MeshData {
        normals: vec![Vec3::Y; positions.len()],
        positions,
        colors,
        indices,
        topology: Topology::Lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icosahedron_detail_counts() {
        let base = icosahedron(1.0, 0);
        assert_eq!(base.primitive_count(), 20);
        let fine = icosahedron(12.0, 3);
        assert_eq!(fine.primitive_count(), 20 * 16);
        for p in &fine.positions {
            assert!((p.length() - 12.0).abs() < 1e-4);
        }
    }

    #[test]
    fn icosahedron_wireframe_edges() {
        // 30 edges on the base solid
        assert_eq!(icosahedron(1.0, 0).wireframe().primitive_count(), 30);
        // closed surface: every edge borders two triangles
        for detail in 1..=3 {
            let solid = icosahedron(12.5, detail);
            let wire = solid.wireframe();
            assert_eq!(wire.topology, Topology::Lines);
            assert_eq!(wire.primitive_count(), solid.primitive_count() * 3 / 2);
        }
    }

    #[test]
    fn wireframe_merges_duplicated_edge_vertices() {
        let (a, b, c, d) = (Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE);
        let split = MeshData {
            positions: vec![a, b, c, c, b + Vec3::splat(1e-6), d],
            normals: vec![Vec3::Z; 6],
            colors: Vec::new(),
            indices: vec![0, 1, 2, 3, 4, 5],
            topology: Topology::Triangles,
        };
        assert_eq!(split.wireframe().primitive_count(), 5);
        let shared = MeshData {
            positions: vec![a, b, c, d],
            normals: vec![Vec3::Z; 4],
            colors: Vec::new(),
            indices: vec![0, 1, 2, 2, 1, 3],
            topology: Topology::Triangles,
        };
        assert_eq!(shared.wireframe().primitive_count(), 5);
    }

    #[test]
    fn cylinder_spans_its_height() {
        let c = cylinder(0.05, 14.0, 6);
        let (lo, hi) = c.positions.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });
        assert_eq!((lo, hi), (-7.0, 7.0));
        // 6 side quads + two 6-triangle caps
        assert_eq!(c.primitive_count(), 12 + 12);
    }

    #[test]
    fn sphere_vertices_on_radius() {
        let s = uv_sphere(0.12, 12, 12);
        for p in &s.positions {
            assert!((p.length() - 0.12).abs() < 1e-5);
        }
        assert!(s.indices.iter().all(|i| (*i as usize) < s.positions.len()));
    }

    #[test]
    fn grid_has_one_center_cross() {
        let g = grid(60.0, 60, [0.0, 0.85, 1.0], [0.0, 0.13, 0.27]);
        assert_eq!(g.primitive_count(), 61 * 2);
        let center = g.colors.iter().filter(|c| **c == [0.0, 0.85, 1.0]).count();
        assert_eq!(center, 4);
    }
}
