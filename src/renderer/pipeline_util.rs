//! Pipeline state shared by the scene passes.

/// Depth buffer format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Single alpha-blended colour target in the surface format.
pub fn blended_target(format: wgpu::TextureFormat) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

/// Depth test against earlier geometry; translucent sprites skip the write.
pub fn depth_stencil_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Bind group layout entry for a buffer visible to both stages.
pub fn buffer_entry(
    binding: u32,
    ty: wgpu::BufferBindingType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Size of the depth texture needed for a surface, or `None` if the
/// current one (`current`) still fits. Zero-sized surfaces never rebuild.
pub fn depth_rebuild(current: Option<(u32, u32)>, surface: (u32, u32)) -> Option<(u32, u32)> {
    if surface.0 == 0 || surface.1 == 0 || current == Some(surface) {
        None
    } else {
        Some(surface)
    }
}

/// Depth texture view for a surface.
pub fn create_depth_view(device: &wgpu::Device, (width, height): (u32, u32)) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_rebuilds_only_on_change() {
        assert_eq!(depth_rebuild(None, (800, 600)), Some((800, 600)));
        assert_eq!(depth_rebuild(Some((800, 600)), (800, 600)), None);
        assert_eq!(depth_rebuild(Some((800, 600)), (1024, 600)), Some((1024, 600)));
        assert_eq!(depth_rebuild(Some((800, 600)), (0, 600)), None);
        assert_eq!(depth_rebuild(None, (0, 0)), None);
    }
}
