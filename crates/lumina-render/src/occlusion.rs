use lumina_core::config::{AddressMode, FilterMode};
use lumina_core::{LuminaError, SamplerConfig};
use lumina_kernel::OcclusionMask;

/// Texture format of the occlusion target. RGBA8 for broad render-target
/// compatibility; the kernel reads the red channel.
pub const OCCLUSION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Occlusion mask texture. Occluders are rendered (or uploaded) into it
/// before the light pass reads it.
pub struct OcclusionTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl OcclusionTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("occlusion-map"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OCCLUSION_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Copy a CPU mask into the texture. The mask must match the texture size.
    pub fn upload(&self, queue: &wgpu::Queue, mask: &OcclusionMask) -> Result<(), LuminaError> {
        if (mask.width(), mask.height()) != (self.width, self.height) {
            return Err(LuminaError::TextureSizeMismatch {
                texture: (self.width, self.height),
                mask: (mask.width(), mask.height()),
            });
        }
        let data = mask_to_rgba8(mask);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }
}

/// Expand single-channel texels into opaque grey RGBA8.
pub fn mask_to_rgba8(mask: &OcclusionMask) -> Vec<u8> {
    mask.texels()
        .iter()
        .flat_map(|&t| {
            let v = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
            [v, v, v, 255]
        })
        .collect()
}

/// Sampler matching the CPU mask's filtering and addressing.
pub fn create_occlusion_sampler(device: &wgpu::Device, config: SamplerConfig) -> wgpu::Sampler {
    let filter = match config.filter {
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
        FilterMode::Linear => wgpu::FilterMode::Linear,
    };
    let address = match config.address {
        AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        AddressMode::Repeat => wgpu::AddressMode::Repeat,
    };
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("occlusion-sampler"),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    })
}
