//! Reflection clouds as camera-facing quads.
//!
//! Points live in a per-cloud storage buffer; the vertex shader expands
//! each into two triangles (six vertices) sized with perspective, so one
//! instanced draw covers the whole cloud.

use super::pipeline_util;
use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::render_context::RenderContext;
use crate::points::PointCloudData;

/// Vertices emitted per point.
pub const VERTICES_PER_POINT: u32 = 6;

/// One point in the storage buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    /// Object-space position.
    pub position: [f32; 3],
    /// Sprite size in world units at unit projection scale.
    pub size: f32,
    /// Point colour.
    pub color: [f32; 3],
    _pad: f32,
}

/// Storage-buffer contents for a cloud.
#[must_use]
pub fn instances(cloud: &PointCloudData) -> Vec<PointInstance> {
    cloud
        .positions
        .iter()
        .zip(&cloud.colors)
        .map(|(p, &color)| PointInstance {
            position: p.to_array(),
            size: cloud.point_size,
            color,
            _pad: 0.0,
        })
        .collect()
}

/// An uploaded cloud and its bind group.
pub struct GpuCloud {
    points: DynamicBuffer<PointInstance>,
    bind_group: wgpu::BindGroup,
}

impl GpuCloud {
    /// Upload `cloud` against the point bind group layout.
    pub fn upload(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, cloud: &PointCloudData) -> Self {
        let points = DynamicBuffer::with_data(
            device,
            "Cloud Points",
            &instances(cloud),
            wgpu::BufferUsages::STORAGE,
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Cloud Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: points.buffer().as_entire_binding(),
            }],
        });
        Self { points, bind_group }
    }

    /// Draw as object `object` of the object table.
    ///
    /// Caller sets the point pipeline and the scene bind group.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, object: u32) {
        if self.points.is_empty() {
            return;
        }
        pass.set_bind_group(1, &self.bind_group, &[]);
        let vertices = self.points.count() as u32 * VERTICES_PER_POINT;
        pass.draw(0..vertices, object..object + 1);
    }

    /// Free GPU memory.
    pub fn destroy(&self) {
        self.points.destroy();
    }
}

/// Point pipeline plus the layout of its per-cloud bind group.
pub struct PointPipeline {
    /// Render pipeline.
    pub pipeline: wgpu::RenderPipeline,
    /// Layout of bind group 1 (the cloud's points).
    pub cloud_layout: wgpu::BindGroupLayout,
}

impl PointPipeline {
    /// Build against the scene bind group layout.
    pub fn new(context: &RenderContext, scene_layout: &wgpu::BindGroupLayout) -> Self {
        let device = &context.device;
        let cloud_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Cloud Layout"),
            entries: &[pipeline_util::buffer_entry(
                0,
                wgpu::BufferBindingType::Storage { read_only: true },
            )],
        });
        let shader = device.create_shader_module(wgpu::include_wgsl!("shaders/points.wgsl"));
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[scene_layout, &cloud_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Points"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &pipeline_util::blended_target(context.format()),
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(pipeline_util::depth_stencil_state(false)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });
        Self {
            pipeline,
            cloud_layout,
        }
    }
}
