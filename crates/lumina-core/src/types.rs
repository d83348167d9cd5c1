use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::DebugMode;
use crate::constants::{
    DEFAULT_LIGHT_COLOR, DEFAULT_LIGHT_INTENSITY, DEFAULT_LIGHT_RADIUS, DEFAULT_MASK_SIZE,
};

/// Straight (non-premultiplied) RGBA output of one pixel evaluation.
pub type Rgba = Vec4;

/// Per-light parameters, immutable for the duration of one frame.
///
/// `radius` is in mask pixels, never normalized: it is compared against the
/// pixel-space distance obtained by scaling uv deltas with `mask_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightParams {
    /// Light centre in normalized mask coordinates, [0,1]².
    pub light_position: Vec2,
    /// Reach in mask pixels.
    pub radius: f32,
    /// Gain applied to the falloff curve.
    pub intensity: f32,
    /// Only read by the additive policy.
    pub color: Vec4,
    /// Occlusion mask resolution in pixels.
    pub mask_size: Vec2,
    /// External fade in [0,1] (light switching on/off, distance culling).
    pub visibility: f32,
    #[serde(default)]
    pub debug_mode: DebugMode,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            light_position: Vec2::splat(0.5),
            radius: DEFAULT_LIGHT_RADIUS,
            intensity: DEFAULT_LIGHT_INTENSITY,
            color: Vec4::from_array(DEFAULT_LIGHT_COLOR),
            mask_size: Vec2::splat(DEFAULT_MASK_SIZE as f32),
            visibility: 1.0,
            debug_mode: DebugMode::Off,
        }
    }
}

impl LightParams {
    /// Light position in world space, assuming the occlusion camera is
    /// centred on the world origin and maps one mask pixel to one unit.
    pub fn light_world_position(&self) -> Vec2 {
        self.light_position * self.mask_size - self.mask_size * 0.5
    }
}
