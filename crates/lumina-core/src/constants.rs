//! Single source of truth for shared constants.
//! These values are used by both Rust and WGSL. The render crate injects
//! them into the light kernel shader preamble.

/// Mask samples strictly above this value block the ray.
pub const OCCLUSION_THRESHOLD: f32 = 0.5;

/// Fast preset: pixel distance per ray-march sample.
pub const FAST_DISTANCE_DIVISOR: f32 = 8.0;

/// Fast preset: minimum ray-march samples.
pub const FAST_MIN_STEPS: u32 = 6;

/// Fast preset: maximum ray-march samples.
pub const FAST_MAX_STEPS: u32 = 32;

/// Quality preset: pixel distance per ray-march sample.
pub const QUALITY_DISTANCE_DIVISOR: f32 = 4.0;

/// Quality preset: minimum ray-march samples.
pub const QUALITY_MIN_STEPS: u32 = 8;

/// Quality preset: maximum ray-march samples.
pub const QUALITY_MAX_STEPS: u32 = 64;

/// Ambient floor of the AmbientDarken policy.
pub const AMBIENT_DARKEN_FLOOR: f32 = 0.1;

/// Maximum overlay opacity of the CappedDarken policy.
pub const CAPPED_DARKEN_MAX_OPACITY: f32 = 0.6;

/// Default occlusion mask resolution (square).
pub const DEFAULT_MASK_SIZE: u32 = 512;

/// Default light reach in mask pixels.
pub const DEFAULT_LIGHT_RADIUS: f32 = 150.0;

/// Default light gain.
pub const DEFAULT_LIGHT_INTENSITY: f32 = 1.2;

/// Default warm light color (RGBA).
pub const DEFAULT_LIGHT_COLOR: [f32; 4] = [1.0, 0.95, 0.8, 1.0];

/// Viewer-to-light distance (world units) beyond which a light fades out.
pub const MAX_VISIBLE_DISTANCE: f32 = 600.0;

/// Side length of the square footprint of an occluder (world units).
pub const OCCLUDER_SIZE: f32 = 32.0;

/// Compute workgroup edge for the light kernel (8x8 = 64 invocations).
pub const LIGHT_WORKGROUP_SIZE: u32 = 8;
