pub mod light_pass;
pub mod occlusion;
pub mod uniforms;

pub use light_pass::{LightPass, LIGHT_OUTPUT_FORMAT};
pub use occlusion::{create_occlusion_sampler, mask_to_rgba8, OcclusionTarget, OCCLUSION_FORMAT};
pub use uniforms::{KernelUniform, LightUniform};
