use lumina_core::constants::{DEFAULT_MASK_SIZE, LIGHT_WORKGROUP_SIZE};
use lumina_core::{CompositingPolicy, KernelConfig, LightParams, LuminaError, SamplerConfig};
use lumina_kernel::OcclusionMask;
use wgpu::util::DeviceExt;

use crate::occlusion::{create_occlusion_sampler, OcclusionTarget};
use crate::uniforms::{KernelUniform, LightUniform};

/// Format of the light overlay written by the compute kernel. Float so the
/// additive policy can exceed 1.0 before blending.
pub const LIGHT_OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Additive colored light: `dst.rgb += src.rgb`, destination alpha kept.
const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Light kernel WGSL with the shared constants injected as a preamble.
pub fn kernel_shader_source() -> String {
    let constants_preamble = format!(
        "const WORKGROUP_SIZE: u32 = {}u;\n\
         const POLICY_AMBIENT_DARKEN: u32 = {}u;\n\
         const POLICY_CAPPED_DARKEN: u32 = {}u;\n\
         const POLICY_ADDITIVE_COLORED_CUTOFF: u32 = {}u;\n",
        LIGHT_WORKGROUP_SIZE,
        CompositingPolicy::AmbientDarken.as_u32(),
        CompositingPolicy::CappedDarken.as_u32(),
        CompositingPolicy::AdditiveColoredCutoff.as_u32(),
    );
    let kernel_wgsl = include_str!("../../../shaders/light/light_kernel.wgsl");
    format!("{constants_preamble}\n{kernel_wgsl}")
}

/// Owns every GPU resource of the light overlay: occlusion target, uniform
/// blocks, compute kernel and composite pipelines.
/// All resources are created up front; per frame only uniforms are written.
pub struct LightPass {
    // Compute kernel
    kernel_pipeline: wgpu::ComputePipeline,
    kernel_bgl: wgpu::BindGroupLayout,
    kernel_bind_group: wgpu::BindGroup,
    params_buffer: wgpu::Buffer,
    config_buffer: wgpu::Buffer,
    // Occlusion input
    occlusion: OcclusionTarget,
    occlusion_sampler: wgpu::Sampler,
    sampler_config: SamplerConfig,
    // Overlay output (compute -> composite)
    output_texture: wgpu::Texture,
    output_view: wgpu::TextureView,
    width: u32,
    height: u32,
    // Composite
    composite_bgl: wgpu::BindGroupLayout,
    composite_bind_group: wgpu::BindGroup,
    composite_sampler: wgpu::Sampler,
    darken_pipeline: wgpu::RenderPipeline,
    additive_pipeline: wgpu::RenderPipeline,
    policy: CompositingPolicy,
}

impl LightPass {
    /// Build all GPU resources for a `width × height` overlay composited onto
    /// a surface of `surface_format`.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &KernelConfig,
    ) -> Self {
        let kernel_source = kernel_shader_source();
        let composite_wgsl = include_str!("../../../shaders/light/composite.wgsl");

        let kernel_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("light-kernel-shader"),
            source: wgpu::ShaderSource::Wgsl(kernel_source.into()),
        });
        let composite_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("light-composite-shader"),
            source: wgpu::ShaderSource::Wgsl(composite_wgsl.into()),
        });

        // -- Uniform buffers --
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light-params"),
            contents: bytemuck::bytes_of(&LightUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let config_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light-kernel-config"),
            contents: bytemuck::bytes_of(&KernelUniform::from(config)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        // -- Occlusion input + overlay output --
        let occlusion = OcclusionTarget::new(device, DEFAULT_MASK_SIZE, DEFAULT_MASK_SIZE);
        let occlusion_sampler = create_occlusion_sampler(device, config.sampler);
        let (output_texture, output_view) = Self::create_output_texture(device, width, height);

        // -- Kernel bind group layout --
        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let kernel_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light-kernel-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                uniform_entry(2),
                uniform_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: LIGHT_OUTPUT_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let kernel_bind_group = Self::create_kernel_bind_group(
            device,
            &kernel_bgl,
            &occlusion.view,
            &occlusion_sampler,
            &params_buffer,
            &config_buffer,
            &output_view,
        );

        // -- Compute pipeline --
        let kernel_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("light-kernel-pipeline-layout"),
                bind_group_layouts: &[&kernel_bgl],
                push_constant_ranges: &[],
            });
        let kernel_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("light-kernel-pipeline"),
            layout: Some(&kernel_pipeline_layout),
            module: &kernel_module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        // -- Composite pipelines --
        let composite_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light-composite-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let composite_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("light-composite-sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let composite_bind_group = Self::create_composite_bind_group(
            device,
            &composite_bgl,
            &output_view,
            &composite_sampler,
        );
        let composite_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("light-composite-pipeline-layout"),
            bind_group_layouts: &[&composite_bgl],
            push_constant_ranges: &[],
        });
        let darken_pipeline = Self::create_composite_pipeline(
            device,
            &composite_layout,
            &composite_module,
            surface_format,
            wgpu::BlendState::ALPHA_BLENDING,
            "light-composite-darken",
        );
        let additive_pipeline = Self::create_composite_pipeline(
            device,
            &composite_layout,
            &composite_module,
            surface_format,
            ADDITIVE_BLEND,
            "light-composite-additive",
        );

        log::info!(
            "Light pass ready: overlay {}x{}, occlusion {}x{}, policy {:?}",
            width,
            height,
            DEFAULT_MASK_SIZE,
            DEFAULT_MASK_SIZE,
            config.policy
        );

        Self {
            kernel_pipeline,
            kernel_bgl,
            kernel_bind_group,
            params_buffer,
            config_buffer,
            occlusion,
            occlusion_sampler,
            sampler_config: config.sampler,
            output_texture,
            output_view,
            width,
            height,
            composite_bgl,
            composite_bind_group,
            composite_sampler,
            darken_pipeline,
            additive_pipeline,
            policy: config.policy,
        }
    }

    /// Recreate the overlay texture and the bind groups that reference it.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        log::debug!(
            "Light overlay resize {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        let (texture, view) = Self::create_output_texture(device, width, height);
        self.output_texture = texture;
        self.output_view = view;
        self.width = width;
        self.height = height;
        self.rebuild_bind_groups(device);
    }

    /// Upload a CPU-side occlusion mask, resizing the occlusion texture when
    /// the mask resolution changed. Must precede `encode` for the frame.
    pub fn upload_occlusion(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mask: &OcclusionMask,
    ) -> Result<(), LuminaError> {
        if (mask.width(), mask.height()) != (self.occlusion.width, self.occlusion.height) {
            log::debug!(
                "Occlusion target resize {}x{} -> {}x{}",
                self.occlusion.width,
                self.occlusion.height,
                mask.width(),
                mask.height()
            );
            self.occlusion = OcclusionTarget::new(device, mask.width(), mask.height());
            self.rebuild_bind_groups(device);
        }
        self.occlusion.upload(queue, mask)
    }

    /// Upload this frame's light parameters.
    pub fn update_params(&self, queue: &wgpu::Queue, params: &LightParams) {
        queue.write_buffer(
            &self.params_buffer,
            0,
            bytemuck::bytes_of(&LightUniform::from(params)),
        );
    }

    /// Apply a new kernel config. The sampler is only rebuilt when its
    /// filtering or addressing changed.
    pub fn update_config(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, config: &KernelConfig) {
        queue.write_buffer(
            &self.config_buffer,
            0,
            bytemuck::bytes_of(&KernelUniform::from(config)),
        );
        if config.sampler != self.sampler_config {
            self.occlusion_sampler = create_occlusion_sampler(device, config.sampler);
            self.sampler_config = config.sampler;
            self.rebuild_bind_groups(device);
        }
        if config.policy != self.policy {
            log::debug!("Light policy {:?} -> {:?}", self.policy, config.policy);
            self.policy = config.policy;
        }
    }

    /// Encode the light kernel dispatch and the composite onto `surface_view`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        self.encode_kernel(encoder);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("light-composite-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        let pipeline = if self.policy.is_darken() {
            &self.darken_pipeline
        } else {
            &self.additive_pipeline
        };
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.composite_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }

    /// Encode only the compute dispatch, for hosts that composite the overlay
    /// themselves via [`output_view`](Self::output_view).
    pub fn encode_kernel(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("light-kernel-pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.kernel_pipeline);
        pass.set_bind_group(0, &self.kernel_bind_group, &[]);
        pass.dispatch_workgroups(
            self.width.div_ceil(LIGHT_WORKGROUP_SIZE),
            self.height.div_ceil(LIGHT_WORKGROUP_SIZE),
            1,
        );
    }

    /// Occlusion texture view, for hosts that rasterize occluders directly.
    pub fn occlusion_view(&self) -> &wgpu::TextureView {
        &self.occlusion.view
    }

    /// Occlusion mask resolution; feed this into `LightParams::mask_size`.
    pub fn occlusion_size(&self) -> (u32, u32) {
        (self.occlusion.width, self.occlusion.height)
    }

    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.output_view
    }

    pub fn output_texture(&self) -> &wgpu::Texture {
        &self.output_texture
    }

    // -- Private helpers --

    fn rebuild_bind_groups(&mut self, device: &wgpu::Device) {
        self.kernel_bind_group = Self::create_kernel_bind_group(
            device,
            &self.kernel_bgl,
            &self.occlusion.view,
            &self.occlusion_sampler,
            &self.params_buffer,
            &self.config_buffer,
            &self.output_view,
        );
        self.composite_bind_group = Self::create_composite_bind_group(
            device,
            &self.composite_bgl,
            &self.output_view,
            &self.composite_sampler,
        );
    }

    fn create_output_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("light-overlay"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LIGHT_OUTPUT_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_kernel_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        occlusion_view: &wgpu::TextureView,
        occlusion_sampler: &wgpu::Sampler,
        params_buffer: &wgpu::Buffer,
        config_buffer: &wgpu::Buffer,
        output_view: &wgpu::TextureView,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light-kernel-bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(occlusion_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(occlusion_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: config_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::TextureView(output_view),
                },
            ],
        })
    }

    fn create_composite_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        output_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light-composite-bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(output_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn create_composite_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        module: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        blend: wgpu::BlendState,
        label: &str,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_source_has_preamble() {
        let src = kernel_shader_source();
        assert!(src.starts_with("const WORKGROUP_SIZE: u32 = 8u;"));
        assert!(src.contains("const POLICY_ADDITIVE_COLORED_CUTOFF: u32 = 2u;"));
        assert!(src.contains("@workgroup_size(WORKGROUP_SIZE, WORKGROUP_SIZE, 1)"));
    }

    #[test]
    fn test_additive_blend_keeps_destination_alpha() {
        assert_eq!(ADDITIVE_BLEND.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(ADDITIVE_BLEND.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(ADDITIVE_BLEND.alpha.dst_factor, wgpu::BlendFactor::One);
    }
}
