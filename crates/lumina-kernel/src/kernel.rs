use glam::{Vec2, Vec4};
use lumina_core::math::pixel_distance;
use lumina_core::{KernelConfig, LightParams, Rgba, SamplerConfig};

use crate::compositor::Compositor;
use crate::falloff::{falloff, light_amount, light_factor};
use crate::march::{RayMarchResult, RayMarcher};
use crate::sampler::{OcclusionMask, OcclusionSampler};

/// Everything the kernel computed for one pixel, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelEvaluation {
    pub d_px: f32,
    /// `None` when the march was skipped (additive policy past the radius).
    pub march: Option<RayMarchResult>,
    pub falloff: f32,
    pub light: f32,
    pub light_factor: f32,
    pub color: Rgba,
}

impl PixelEvaluation {
    pub fn blocked(&self) -> bool {
        self.march.is_some_and(|m| m.blocked)
    }
}

/// The per-pixel light kernel: one configured instance serves every pixel
/// of every frame that shares a config. Holds no mutable state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightKernel {
    marcher: RayMarcher,
    compositor: Compositor,
    sampler: SamplerConfig,
}

impl LightKernel {
    pub fn new(config: &KernelConfig) -> Self {
        Self {
            marcher: RayMarcher::new(config.occlusion_threshold, config.step_budget),
            compositor: Compositor::from_config(config),
            sampler: config.sampler,
        }
    }

    /// Filtering and addressing the config asks for.
    pub fn sampler_config(&self) -> SamplerConfig {
        self.sampler
    }

    /// Switch `mask` to this kernel's sampler so CPU lookups filter the same
    /// way as the GPU sampler built from the same config.
    pub fn configure_mask(&self, mask: &mut OcclusionMask) {
        if mask.sampler() != self.sampler {
            log::debug!("Occlusion mask sampler {:?} -> {:?}", mask.sampler(), self.sampler);
            mask.set_sampler(self.sampler);
        }
    }

    /// Output color for the pixel at normalized coordinate `uv`.
    pub fn evaluate<S>(&self, sampler: &S, params: &LightParams, uv: Vec2) -> Rgba
    where
        S: OcclusionSampler + ?Sized,
    {
        let d_px = pixel_distance(params.light_position, uv, params.mask_size);
        if self.compositor.cuts_off_beyond_radius() && d_px > params.radius {
            return Vec4::ZERO;
        }
        let march = self
            .marcher
            .march(sampler, params.light_position, uv, params.mask_size);
        self.compositor.compose(params, d_px, march.blocked)
    }

    /// Same as [`evaluate`](Self::evaluate) but keeps the intermediate values.
    pub fn evaluate_detailed<S>(&self, sampler: &S, params: &LightParams, uv: Vec2) -> PixelEvaluation
    where
        S: OcclusionSampler + ?Sized,
    {
        let d_px = pixel_distance(params.light_position, uv, params.mask_size);
        let curve = falloff(d_px, params.radius);
        let march = if self.compositor.cuts_off_beyond_radius() && d_px > params.radius {
            None
        } else {
            Some(
                self.marcher
                    .march(sampler, params.light_position, uv, params.mask_size),
            )
        };
        let blocked = march.is_some_and(|m| m.blocked);
        let light = light_amount(curve, params.intensity, blocked);
        let color = match march {
            Some(_) => self.compositor.compose(params, d_px, blocked),
            None => Vec4::ZERO,
        };
        PixelEvaluation {
            d_px,
            march,
            falloff: curve,
            light,
            light_factor: light_factor(self.compositor.ambient, light, params.visibility),
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::config::{AddressMode, FilterMode};
    use lumina_core::CompositingPolicy;
    use proptest::prelude::*;

    fn scenario_params() -> LightParams {
        LightParams {
            light_position: Vec2::splat(0.5),
            radius: 100.0,
            intensity: 1.0,
            mask_size: Vec2::splat(200.0),
            visibility: 1.0,
            ..LightParams::default()
        }
    }

    fn empty_mask() -> OcclusionMask {
        OcclusionMask::new(200, 200).unwrap()
    }

    #[test]
    fn test_concrete_scenario_empty_mask() {
        let kernel = LightKernel::new(&KernelConfig::with_policy(CompositingPolicy::AmbientDarken));
        let mask = empty_mask();
        let p = scenario_params();

        let centre = kernel.evaluate(&mask, &p, Vec2::new(0.5, 0.5));
        assert!(centre.w.abs() < 1e-6);

        let edge = kernel.evaluate(&mask, &p, Vec2::new(1.0, 0.5));
        assert!((edge.w - 0.9).abs() < 1e-6, "alpha {}", edge.w);
    }

    #[test]
    fn test_concrete_scenario_full_occlusion() {
        let kernel = LightKernel::new(&KernelConfig::default());
        let mut mask = empty_mask();
        mask.fill(1.0);
        let p = scenario_params();

        let at_light = kernel.evaluate_detailed(&mask, &p, p.light_position);
        assert!(!at_light.blocked());
        assert_eq!(at_light.light, 1.0);

        for uv in [Vec2::new(0.6, 0.5), Vec2::new(0.0, 1.0), Vec2::new(0.52, 0.48)] {
            let eval = kernel.evaluate_detailed(&mask, &p, uv);
            assert!(eval.blocked(), "uv {uv} should be blocked");
            assert_eq!(eval.light, 0.0);
            assert!((eval.color.w - 0.9).abs() < 1e-6);
        }
    }

    #[test]
    fn test_additive_skips_march_beyond_radius() {
        let kernel = LightKernel::new(&KernelConfig::with_policy(
            CompositingPolicy::AdditiveColoredCutoff,
        ));
        let panicking = |_: Vec2| -> f32 { panic!("sampler must not be called past the radius") };
        let p = scenario_params();
        let out = kernel.evaluate(&panicking, &p, Vec2::new(1.0, 1.0));
        assert_eq!(out, Vec4::ZERO);
        let eval = kernel.evaluate_detailed(&panicking, &p, Vec2::new(0.0, 0.0));
        assert!(eval.march.is_none());
    }

    #[test]
    fn test_detailed_matches_evaluate() {
        let mut mask = empty_mask();
        mask.fill_rect_uv(Vec2::new(0.6, 0.3), Vec2::new(0.65, 0.7), 1.0);
        let p = scenario_params();
        for policy in [
            CompositingPolicy::AmbientDarken,
            CompositingPolicy::CappedDarken,
            CompositingPolicy::AdditiveColoredCutoff,
        ] {
            let kernel = LightKernel::new(&KernelConfig::with_policy(policy));
            for uv in [Vec2::new(0.9, 0.5), Vec2::new(0.55, 0.5), Vec2::new(0.2, 0.9)] {
                assert_eq!(
                    kernel.evaluate(&mask, &p, uv),
                    kernel.evaluate_detailed(&mask, &p, uv).color
                );
            }
        }
    }

    #[test]
    fn test_linear_sampler_in_config_changes_cpu_result() {
        // 4x1 mask with a single 0.6 texel; the light sits just inside its left edge
        let texels = vec![0.0, 0.6, 0.0, 0.0];
        let p = LightParams {
            light_position: Vec2::new(0.26, 0.5),
            radius: 4.0,
            intensity: 1.0,
            mask_size: Vec2::new(4.0, 1.0),
            visibility: 1.0,
            ..LightParams::default()
        };
        let target = Vec2::new(0.0, 0.5);

        let nearest = LightKernel::new(&KernelConfig::default());
        let mut nearest_mask = OcclusionMask::from_texels(4, 1, texels.clone()).unwrap();
        nearest.configure_mask(&mut nearest_mask);
        assert!(nearest.evaluate_detailed(&nearest_mask, &p, target).blocked());

        let mut config = KernelConfig::default();
        config.sampler = SamplerConfig {
            filter: FilterMode::Linear,
            address: AddressMode::ClampToEdge,
        };
        let linear = LightKernel::new(&config);
        assert_eq!(linear.sampler_config(), config.sampler);
        let mut mask = OcclusionMask::from_texels(4, 1, texels).unwrap();
        linear.configure_mask(&mut mask);
        assert_eq!(mask.sampler().filter, FilterMode::Linear);
        // Bilinear weight at the light is ~0.32, below the threshold
        assert!(!linear.evaluate_detailed(&mask, &p, target).blocked());
        assert_ne!(
            nearest.evaluate(&nearest_mask, &p, target),
            linear.evaluate(&mask, &p, target)
        );
    }

    #[test]
    fn test_zero_radius_does_not_panic() {
        let kernel = LightKernel::new(&KernelConfig::default());
        let p = LightParams {
            radius: 0.0,
            ..scenario_params()
        };
        let out = kernel.evaluate(&empty_mask(), &p, Vec2::new(0.7, 0.5));
        assert!((out.w - 0.9).abs() < 1e-6);
        assert!(out.is_finite());
    }

    proptest! {
        #[test]
        fn prop_blocked_means_no_light(
            x in 0.0f32..=1.0,
            y in 0.0f32..=1.0,
            intensity in 0.0f32..10.0,
        ) {
            let kernel = LightKernel::new(&KernelConfig::default());
            let solid = |_: Vec2| 1.0_f32;
            let p = LightParams { intensity, ..scenario_params() };
            let eval = kernel.evaluate_detailed(&solid, &p, Vec2::new(x, y));
            if eval.blocked() {
                prop_assert_eq!(eval.light, 0.0);
            }
        }

        #[test]
        fn prop_policy_output_ranges(
            x in 0.0f32..=1.0,
            y in 0.0f32..=1.0,
            occ in 0.0f32..=1.0,
            intensity in 0.0f32..3.0,
            visibility in 0.0f32..=1.0,
        ) {
            let p = LightParams { intensity, visibility, ..scenario_params() };
            let mask = move |_: Vec2| occ;
            let uv = Vec2::new(x, y);
            for (policy, cap) in [
                (CompositingPolicy::AmbientDarken, 1.0),
                (CompositingPolicy::CappedDarken, 0.6),
            ] {
                let out = LightKernel::new(&KernelConfig::with_policy(policy)).evaluate(&mask, &p, uv);
                prop_assert_eq!(out.truncate(), glam::Vec3::ZERO);
                prop_assert!(out.w >= 0.0 && out.w <= cap + 1e-6);
            }
            let additive = LightKernel::new(&KernelConfig::with_policy(CompositingPolicy::AdditiveColoredCutoff));
            let eval = additive.evaluate_detailed(&mask, &p, uv);
            if eval.d_px > p.radius || eval.blocked() {
                prop_assert_eq!(eval.color, Vec4::ZERO);
            }
        }
    }
}
