//! Binary visibility test along the light → pixel segment.

use glam::Vec2;
use lumina_core::constants::OCCLUSION_THRESHOLD;
use lumina_core::math::pixel_distance;
use lumina_core::StepBudget;

use crate::sampler::OcclusionSampler;

/// Outcome of one ray march. `samples` is how many mask lookups were made
/// before the answer was known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayMarchResult {
    pub blocked: bool,
    pub samples: u32,
}

impl RayMarchResult {
    const UNBLOCKED_EMPTY: Self = Self {
        blocked: false,
        samples: 0,
    };
}

/// Adaptive sample count for a segment of `d_px` mask pixels.
/// Always within `budget.bounds()`, including for NaN or infinite input.
pub fn step_count(d_px: f32, budget: &StepBudget) -> u32 {
    let (min, max) = budget.bounds();
    let raw = (d_px / budget.distance_divisor).round();
    if !raw.is_finite() {
        return max;
    }
    // Negative raw saturates to 0 in the cast, then clamps up to min
    (raw as u32).clamp(min, max)
}

/// Ray marcher with a fixed threshold and step budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayMarcher {
    pub threshold: f32,
    pub budget: StepBudget,
}

impl Default for RayMarcher {
    fn default() -> Self {
        Self {
            threshold: OCCLUSION_THRESHOLD,
            budget: StepBudget::default(),
        }
    }
}

impl RayMarcher {
    pub fn new(threshold: f32, budget: StepBudget) -> Self {
        Self { threshold, budget }
    }

    /// March from `light_position` toward `pixel_uv`, sampling at
    /// `t = i / steps` for `i` in `0..steps`. The first sample strictly above
    /// the threshold blocks the ray and ends the march.
    ///
    /// A zero-length segment (pixel at the light) is unblocked without sampling.
    pub fn march<S>(&self, sampler: &S, light_position: Vec2, pixel_uv: Vec2, mask_size: Vec2) -> RayMarchResult
    where
        S: OcclusionSampler + ?Sized,
    {
        let d_px = pixel_distance(light_position, pixel_uv, mask_size);
        if d_px == 0.0 {
            return RayMarchResult::UNBLOCKED_EMPTY;
        }

        let steps = step_count(d_px, &self.budget);
        let delta = (pixel_uv - light_position) / steps as f32;

        for i in 0..steps {
            let cursor = light_position + delta * i as f32;
            if sampler.sample(cursor) > self.threshold {
                return RayMarchResult {
                    blocked: true,
                    samples: i + 1,
                };
            }
        }

        RayMarchResult {
            blocked: false,
            samples: steps,
        }
    }
}
