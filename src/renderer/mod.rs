//! GPU mirror of the reciprocal-space scene.
//!
//! [`SceneRenderer`] never owns scene state. Each frame it drains the scene
//! pool's released ids, destroying the matching GPU buffers, uploads any
//! geometry it has not seen yet, rewrites the uniforms and records one
//! render pass.

pub mod mesh_pass;
pub(crate) mod pipeline_util;
pub mod point_pass;
pub mod resident;
pub mod uniforms;

use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use self::mesh_pass::{GpuMesh, MeshPipelines};
use self::point_pass::{GpuCloud, PointPipeline};
use self::resident::ResidentSet;
use self::uniforms::{FrameUniform, ObjectUniform};
use crate::camera::CameraUniform;
use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::render_context::RenderContext;
use crate::scene::{ResourceKind, SceneAnimator, SceneState};

const INITIAL_OBJECTS: usize = 64;

/// Draws a [`SceneState`] and keeps its GPU resources in step with the
/// scene's resource pool.
pub struct SceneRenderer {
    camera: CameraUniform,
    camera_buffer: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    objects: DynamicBuffer<ObjectUniform>,
    scene_layout: wgpu::BindGroupLayout,
    scene_bind_group: wgpu::BindGroup,
    meshes: MeshPipelines,
    points: PointPipeline,
    geometry: ResidentSet<GpuMesh>,
    clouds: ResidentSet<GpuCloud>,
    depth: Option<((u32, u32), wgpu::TextureView)>,
    clear: wgpu::Color,
}

impl SceneRenderer {
    /// Create pipelines and uniform buffers.
    pub fn new(context: &RenderContext) -> Self {
        let device = &context.device;
        let camera = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform"),
            contents: bytemuck::bytes_of(&camera),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform"),
            contents: bytemuck::bytes_of(&FrameUniform::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let objects = DynamicBuffer::new(
            device,
            "Object Table",
            INITIAL_OBJECTS,
            wgpu::BufferUsages::STORAGE,
        );

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Layout"),
            entries: &[
                pipeline_util::buffer_entry(0, wgpu::BufferBindingType::Uniform),
                pipeline_util::buffer_entry(1, wgpu::BufferBindingType::Uniform),
                pipeline_util::buffer_entry(
                    2,
                    wgpu::BufferBindingType::Storage { read_only: true },
                ),
            ],
        });
        let scene_bind_group =
            create_scene_bind_group(device, &scene_layout, &camera_buffer, &frame_buffer, &objects);

        Self {
            meshes: MeshPipelines::new(context, &scene_layout),
            points: PointPipeline::new(context, &scene_layout),
            camera,
            camera_buffer,
            frame_buffer,
            objects,
            scene_layout,
            scene_bind_group,
            geometry: ResidentSet::default(),
            clouds: ResidentSet::default(),
            depth: None,
            clear: wgpu::Color::BLACK,
        }
    }

    /// Bring GPU state up to date with `scene`: free released resources,
    /// upload new ones and write this frame's uniforms. The first call
    /// attaches this renderer as the pool's mirror.
    pub fn sync(&mut self, context: &RenderContext, scene: &mut SceneAnimator) {
        let pool = scene.pool_mut();
        pool.attach_mirror();
        let released: Vec<_> = pool
            .drain_released()
            .into_iter()
            .filter(|(_, kind)| *kind == ResourceKind::Geometry)
            .map(|(id, _)| id)
            .collect();
        let freed = self.geometry.evict(released.iter().copied(), |m| m.destroy())
            + self.clouds.evict(released, |c| c.destroy());
        if freed > 0 {
            log::debug!("freed {freed} GPU geometries");
        }

        let state = scene.state();
        let device = &context.device;
        for mesh in state.meshes() {
            let _ = self
                .geometry
                .ensure(mesh.geometry.id, || GpuMesh::upload(device, &mesh.geometry.mesh));
        }
        for cloud in &state.clouds {
            let layout = &self.points.cloud_layout;
            let _ = self
                .clouds
                .ensure(cloud.geometry_id, || GpuCloud::upload(device, layout, &cloud.data));
        }

        self.write_uniforms(context, state);
    }

    fn write_uniforms(&mut self, context: &RenderContext, state: &SceneState) {
        let queue = &context.queue;
        self.camera.update(&state.camera, context.size().1);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&self.camera));
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniform::from_scene(state)),
        );
        let table = uniforms::object_table(state);
        if self.objects.write(&context.device, queue, &table) {
            self.scene_bind_group = create_scene_bind_group(
                &context.device,
                &self.scene_layout,
                &self.camera_buffer,
                &self.frame_buffer,
                &self.objects,
            );
        }
        let [r, g, b] = state.background;
        self.clear = wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        };
    }

    /// Rebuild the depth target if the surface size changed. Returns whether
    /// a rebuild happened.
    pub fn resize(&mut self, device: &wgpu::Device, size: (u32, u32)) -> bool {
        let current = self.depth.as_ref().map(|(s, _)| *s);
        match pipeline_util::depth_rebuild(current, size) {
            Some(size) => {
                self.depth = Some((size, pipeline_util::create_depth_view(device, size)));
                true
            }
            None => false,
        }
    }

    /// Record and submit the scene into `view`. `scene` must be the state
    /// last passed to [`sync`](Self::sync).
    pub fn render(&mut self, context: &RenderContext, view: &wgpu::TextureView, scene: &SceneState) {
        let _ = self.resize(&context.device, context.size());
        let Some((_, depth)) = &self.depth else {
            return;
        };

        let mut encoder = context.create_encoder();
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_bind_group(0, &self.scene_bind_group, &[]);

            // Object indices follow `uniforms::object_table`: clouds, then meshes.
            pass.set_pipeline(&self.points.pipeline);
            for (i, cloud) in scene.clouds.iter().enumerate() {
                if let Some(gpu) = self.clouds.get(cloud.geometry_id) {
                    gpu.draw(&mut pass, i as u32);
                }
            }
            let first_mesh = scene.clouds.len();
            for (i, mesh) in scene.meshes().enumerate() {
                if let Some(gpu) = self.geometry.get(mesh.geometry.id) {
                    pass.set_pipeline(
                        self.meshes.select(gpu.topology(), mesh.material.double_sided),
                    );
                    gpu.draw(&mut pass, (first_mesh + i) as u32);
                }
            }
        }
        context.submit(encoder);
    }

    /// Uploaded mesh and cloud counts.
    pub fn resident_counts(&self) -> (usize, usize) {
        (self.geometry.len(), self.clouds.len())
    }
}

fn create_scene_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    camera: &wgpu::Buffer,
    frame: &wgpu::Buffer,
    objects: &DynamicBuffer<ObjectUniform>,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Scene Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: camera.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: frame.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: objects.buffer().as_entire_binding(),
            },
        ],
    })
}
