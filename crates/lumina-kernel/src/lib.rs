pub mod compositor;
pub mod debug;
pub mod falloff;
pub mod frame;
pub mod kernel;
pub mod march;
pub mod sampler;
pub mod visibility;

pub use debug::shade;
pub use frame::{render_frame, LightFrame};
pub use kernel::{LightKernel, PixelEvaluation};
pub use march::{RayMarchResult, RayMarcher};
pub use sampler::{OcclusionMask, OcclusionSampler};
pub use visibility::{LineOfSight, OccluderRect};
