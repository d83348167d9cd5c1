use lumina_core::{KernelConfig, LightParams};

/// GPU light parameter block (48 bytes, matches LightParams in light_kernel.wgsl).
///
/// Field order is the host/shader contract. `radius` is in mask pixels and
/// is compared against `length((uv - light_position) * mask_size)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub light_position: [f32; 2],
    pub radius: f32,
    pub intensity: f32,
    pub color: [f32; 4],
    pub mask_size: [f32; 2],
    pub visibility: f32,
    pub debug_mode: f32,
}

impl From<&LightParams> for LightUniform {
    fn from(p: &LightParams) -> Self {
        Self {
            light_position: p.light_position.to_array(),
            radius: p.radius,
            intensity: p.intensity,
            color: p.color.to_array(),
            mask_size: p.mask_size.to_array(),
            visibility: p.visibility,
            debug_mode: p.debug_mode.as_selector(),
        }
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::from(&LightParams::default())
    }
}

/// GPU kernel configuration block (32 bytes, matches KernelConfig in light_kernel.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct KernelUniform {
    pub occlusion_threshold: f32,
    pub distance_divisor: f32,
    pub min_steps: u32,
    pub max_steps: u32,
    pub policy: u32,
    pub ambient: f32,
    pub max_opacity: f32,
    pub _padding: u32,
}

impl From<&KernelConfig> for KernelUniform {
    fn from(c: &KernelConfig) -> Self {
        let (min_steps, max_steps) = c.step_budget.bounds();
        Self {
            occlusion_threshold: c.occlusion_threshold,
            distance_divisor: c.step_budget.distance_divisor,
            min_steps,
            max_steps,
            policy: c.policy.as_u32(),
            ambient: c.ambient(),
            max_opacity: c.max_opacity().clamp(0.0, 1.0),
            _padding: 0,
        }
    }
}

impl Default for KernelUniform {
    fn default() -> Self {
        Self::from(&KernelConfig::default())
    }
}
