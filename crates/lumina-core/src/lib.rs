pub mod config;
pub mod constants;
pub mod error;
pub mod math;
pub mod types;

pub use config::{CompositingPolicy, DebugMode, KernelConfig, SamplerConfig, StepBudget};
pub use error::LuminaError;
pub use types::{LightParams, Rgba};
