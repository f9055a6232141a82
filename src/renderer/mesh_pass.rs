//! Indexed meshes: lit triangles and unlit lines.
//!
//! Each geometry in the scene pool uploads once into a [`GpuMesh`]; per
//! draw, the object table supplies model matrix and material.

use glam::Vec3;

use super::pipeline_util;
use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::render_context::RenderContext;
use crate::scene::mesh_gen::{MeshData, Topology};

/// Vertex layout shared by every mesh pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Vertex colour, multiplied with the material colour.
    pub color: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    /// Buffer layout for pipeline creation.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave a mesh's attributes. Missing normals become zero and
/// missing colours white.
#[must_use]
pub fn interleave(mesh: &MeshData) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| MeshVertex {
            position: p.to_array(),
            normal: mesh.normals.get(i).copied().unwrap_or(Vec3::ZERO).to_array(),
            color: mesh.colors.get(i).copied().unwrap_or([1.0; 3]),
        })
        .collect()
}

/// An uploaded mesh.
pub struct GpuMesh {
    vertices: DynamicBuffer<MeshVertex>,
    indices: DynamicBuffer<u32>,
    topology: Topology,
}

impl GpuMesh {
    /// Upload `mesh`.
    pub fn upload(device: &wgpu::Device, mesh: &MeshData) -> Self {
        Self {
            vertices: DynamicBuffer::with_data(
                device,
                "Mesh Vertices",
                &interleave(mesh),
                wgpu::BufferUsages::VERTEX,
            ),
            indices: DynamicBuffer::with_data(
                device,
                "Mesh Indices",
                &mesh.indices,
                wgpu::BufferUsages::INDEX,
            ),
            topology: mesh.topology,
        }
    }

    /// Primitive assembly of the source mesh.
    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Bind buffers and draw as object `object` of the object table.
    ///
    /// Caller sets pipeline and bind groups.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, object: u32) {
        if self.indices.is_empty() {
            return;
        }
        pass.set_vertex_buffer(0, self.vertices.buffer().slice(..));
        pass.set_index_buffer(self.indices.buffer().slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.indices.count() as u32, 0, object..object + 1);
    }

    /// Free GPU memory.
    pub fn destroy(&self) {
        self.vertices.destroy();
        self.indices.destroy();
    }
}

/// Pipelines for the three mesh variants.
pub struct MeshPipelines {
    /// Lit, back faces culled.
    pub lit: wgpu::RenderPipeline,
    /// Lit, both faces.
    pub lit_double_sided: wgpu::RenderPipeline,
    /// Unlit line list.
    pub lines: wgpu::RenderPipeline,
}

impl MeshPipelines {
    /// Build all mesh pipelines against the scene bind group layout.
    pub fn new(context: &RenderContext, scene_layout: &wgpu::BindGroupLayout) -> Self {
        let shader = context
            .device
            .create_shader_module(wgpu::include_wgsl!("shaders/mesh.wgsl"));
        let layout = context
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: &[scene_layout],
                push_constant_ranges: &[],
            });
        let build = |label: &str, fragment: &str, topology, cull_mode| {
            create_mesh_pipeline(context, &shader, &layout, label, fragment, topology, cull_mode)
        };
        Self {
            lit: build(
                "Mesh Lit",
                "fs_lit",
                wgpu::PrimitiveTopology::TriangleList,
                Some(wgpu::Face::Back),
            ),
            lit_double_sided: build(
                "Mesh Lit Double-Sided",
                "fs_lit",
                wgpu::PrimitiveTopology::TriangleList,
                None,
            ),
            lines: build(
                "Mesh Lines",
                "fs_unlit",
                wgpu::PrimitiveTopology::LineList,
                None,
            ),
        }
    }

    /// Pipeline for a mesh of `topology` with the given sidedness.
    pub fn select(&self, topology: Topology, double_sided: bool) -> &wgpu::RenderPipeline {
        match (topology, double_sided) {
            (Topology::Lines, _) => &self.lines,
            (Topology::Triangles, true) => &self.lit_double_sided,
            (Topology::Triangles, false) => &self.lit,
        }
    }
}

fn create_mesh_pipeline(
    context: &RenderContext,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
    label: &str,
    fragment_entry: &str,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
) -> wgpu::RenderPipeline {
    context
        .device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(fragment_entry),
                targets: &pipeline_util::blended_target(context.format()),
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(pipeline_util::depth_stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::mesh_gen;

    #[test]
    fn vertex_stride() {
        assert_eq!(size_of::<MeshVertex>(), 36);
        assert_eq!(MeshVertex::layout().array_stride, 36);
    }

    #[test]
    fn interleave_fills_missing_colors() {
        let mesh = mesh_gen::uv_sphere(1.0, 8, 6);
        let verts = interleave(&mesh);
        assert_eq!(verts.len(), mesh.positions.len());
        assert!(verts.iter().all(|v| v.color == [1.0; 3]));
        let n = Vec3::from_array(verts[0].normal);
        assert!((n.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn interleave_keeps_grid_colors() {
        let center = [0.0, 0.85, 1.0];
        let mesh = mesh_gen::grid(10.0, 4, center, [0.0, 0.13, 0.27]);
        let verts = interleave(&mesh);
        assert!(verts.iter().any(|v| v.color == center));
    }
}
