use serde::{Deserialize, Serialize};

use crate::constants::{
    AMBIENT_DARKEN_FLOOR, CAPPED_DARKEN_MAX_OPACITY, FAST_DISTANCE_DIVISOR, FAST_MAX_STEPS,
    FAST_MIN_STEPS, OCCLUSION_THRESHOLD, QUALITY_DISTANCE_DIVISOR, QUALITY_MAX_STEPS,
    QUALITY_MIN_STEPS,
};

/// Adaptive ray-march sample budget.
/// Samples scale with pixel distance (`d_px / distance_divisor`), clamped to
/// `[min_steps, max_steps]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepBudget {
    pub min_steps: u32,
    pub max_steps: u32,
    pub distance_divisor: f32,
}

impl StepBudget {
    /// Cheap preset: divisor 8, 6..=32 samples.
    pub const FAST: Self = Self {
        min_steps: FAST_MIN_STEPS,
        max_steps: FAST_MAX_STEPS,
        distance_divisor: FAST_DISTANCE_DIVISOR,
    };

    /// Dense preset: divisor 4, 8..=64 samples.
    pub const QUALITY: Self = Self {
        min_steps: QUALITY_MIN_STEPS,
        max_steps: QUALITY_MAX_STEPS,
        distance_divisor: QUALITY_DISTANCE_DIVISOR,
    };

    /// Bounds the march loop can rely on: `1 <= min <= max`.
    pub fn bounds(&self) -> (u32, u32) {
        let min = self.min_steps.max(1);
        (min, self.max_steps.max(min))
    }
}

impl Default for StepBudget {
    fn default() -> Self {
        Self::QUALITY
    }
}

/// How the computed light factor becomes an output color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum CompositingPolicy {
    /// Black overlay whose alpha is `1 - light_factor`, with a 0.1 ambient floor.
    #[default]
    AmbientDarken = 0,
    /// Black overlay without ambient, alpha capped at 0.6.
    CappedDarken = 1,
    /// Colored light added near the source, transparent past the radius.
    AdditiveColoredCutoff = 2,
}

impl CompositingPolicy {
    /// Selector value stored in the GPU kernel config block.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn default_ambient(self) -> f32 {
        match self {
            CompositingPolicy::AmbientDarken => AMBIENT_DARKEN_FLOOR,
            CompositingPolicy::CappedDarken | CompositingPolicy::AdditiveColoredCutoff => 0.0,
        }
    }

    pub fn default_max_opacity(self) -> f32 {
        match self {
            CompositingPolicy::CappedDarken => CAPPED_DARKEN_MAX_OPACITY,
            CompositingPolicy::AmbientDarken | CompositingPolicy::AdditiveColoredCutoff => 1.0,
        }
    }

    /// True for the darkness-overlay policies (alpha-blended over the scene).
    pub fn is_darken(self) -> bool {
        !matches!(self, CompositingPolicy::AdditiveColoredCutoff)
    }
}

/// Texel filtering used when sampling the occlusion mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Addressing for coordinates outside [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Occlusion sampler description, shared by the CPU mask and the GPU sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default)]
    pub filter: FilterMode,
    #[serde(default)]
    pub address: AddressMode,
}

/// Diagnostic output selector. Anything other than `Off` bypasses the
/// lighting algorithm entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u32)]
pub enum DebugMode {
    #[default]
    Off = 0,
    SolidOverlay = 1,
    UvGradient = 2,
    ParamsAsColor = 3,
    RadialTest = 4,
}

impl DebugMode {
    /// Decode the float selector carried in the parameter block.
    /// Unknown or non-finite values fall back to `Off`.
    pub fn from_selector(value: f32) -> Self {
        if !value.is_finite() {
            return DebugMode::Off;
        }
        match value.round() as i64 {
            1 => DebugMode::SolidOverlay,
            2 => DebugMode::UvGradient,
            3 => DebugMode::ParamsAsColor,
            4 => DebugMode::RadialTest,
            _ => DebugMode::Off,
        }
    }

    pub fn as_selector(self) -> f32 {
        self as u32 as f32
    }
}

/// Complete kernel configuration: everything that is a tuning choice rather
/// than per-light data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Mask samples strictly above this block the ray.
    #[serde(default = "default_threshold")]
    pub occlusion_threshold: f32,
    #[serde(default)]
    pub step_budget: StepBudget,
    #[serde(default)]
    pub policy: CompositingPolicy,
    /// Overrides the policy's ambient floor.
    #[serde(default)]
    pub ambient: Option<f32>,
    /// Overrides the policy's maximum overlay opacity.
    #[serde(default)]
    pub max_opacity: Option<f32>,
    #[serde(default)]
    pub sampler: SamplerConfig,
}

fn default_threshold() -> f32 {
    OCCLUSION_THRESHOLD
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self::with_policy(CompositingPolicy::default())
    }
}

impl KernelConfig {
    pub fn with_policy(policy: CompositingPolicy) -> Self {
        Self {
            occlusion_threshold: OCCLUSION_THRESHOLD,
            step_budget: StepBudget::default(),
            policy,
            ambient: None,
            max_opacity: None,
            sampler: SamplerConfig::default(),
        }
    }

    /// Ambient floor in effect (override, else policy default).
    pub fn ambient(&self) -> f32 {
        self.ambient.unwrap_or_else(|| self.policy.default_ambient())
    }

    /// Overlay opacity cap in effect (override, else policy default).
    pub fn max_opacity(&self) -> f32 {
        self.max_opacity
            .unwrap_or_else(|| self.policy.default_max_opacity())
    }
}
