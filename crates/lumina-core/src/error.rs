use thiserror::Error;

/// Errors raised by the host-side plumbing around the light kernel.
/// The per-pixel kernel itself never fails.
#[derive(Debug, Error)]
pub enum LuminaError {
    #[error("occlusion mask has zero extent ({width}x{height})")]
    EmptyMask { width: u32, height: u32 },

    #[error("occlusion mask texel count mismatch: expected {expected}, got {actual}")]
    MaskSizeMismatch { expected: usize, actual: usize },

    #[error("occlusion texture is {texture:?} but mask is {mask:?}")]
    TextureSizeMismatch { texture: (u32, u32), mask: (u32, u32) },

    #[error("GPU adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("Failed to request GPU device: {0}")]
    DeviceRequestFailed(String),
}
