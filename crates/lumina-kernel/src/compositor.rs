//! Maps falloff + occlusion into the final overlay color for each policy.

use glam::{Vec3, Vec4};
use lumina_core::{CompositingPolicy, KernelConfig, LightParams, Rgba};

use crate::falloff::{falloff, light_amount, light_factor, sanitize_intensity, sanitize_visibility};

/// Policy-resolved compositing constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compositor {
    pub policy: CompositingPolicy,
    pub ambient: f32,
    pub max_opacity: f32,
}

impl Compositor {
    pub fn from_config(config: &KernelConfig) -> Self {
        Self {
            policy: config.policy,
            ambient: config.ambient(),
            max_opacity: config.max_opacity().clamp(0.0, 1.0),
        }
    }

    /// True when the policy outputs nothing past the radius, so callers may
    /// skip the ray march there.
    pub fn cuts_off_beyond_radius(&self) -> bool {
        self.policy == CompositingPolicy::AdditiveColoredCutoff
    }

    /// Final RGBA for a pixel at pixel distance `d_px` with the given
    /// occlusion result.
    pub fn compose(&self, params: &LightParams, d_px: f32, blocked: bool) -> Rgba {
        let curve = falloff(d_px, params.radius);
        match self.policy {
            CompositingPolicy::AmbientDarken | CompositingPolicy::CappedDarken => {
                let light = light_amount(curve, params.intensity, blocked);
                let factor = light_factor(self.ambient, light, params.visibility);
                let alpha = (1.0 - factor).clamp(0.0, 1.0) * self.max_opacity;
                Vec4::new(0.0, 0.0, 0.0, alpha)
            }
            CompositingPolicy::AdditiveColoredCutoff => {
                if blocked || d_px > params.radius || curve <= 0.0 {
                    return Vec4::ZERO;
                }
                let gain = curve
                    * sanitize_intensity(params.intensity)
                    * sanitize_visibility(params.visibility);
                let rgb = Vec3::new(params.color.x, params.color.y, params.color.z) * gain;
                rgb.extend(params.color.w * gain)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn params() -> LightParams {
        LightParams {
            light_position: Vec2::splat(0.5),
            radius: 100.0,
            intensity: 1.0,
            color: Vec4::new(1.0, 0.5, 0.25, 1.0),
            mask_size: Vec2::splat(200.0),
            visibility: 1.0,
            ..LightParams::default()
        }
    }

    fn compositor(policy: CompositingPolicy) -> Compositor {
        Compositor::from_config(&KernelConfig::with_policy(policy))
    }

    #[test]
    fn test_ambient_darken_scenario() {
        let c = compositor(CompositingPolicy::AmbientDarken);
        let centre = c.compose(&params(), 0.0, false);
        assert_eq!(centre, Vec4::ZERO);
        let edge = c.compose(&params(), 100.0, false);
        assert!((edge.w - 0.9).abs() < 1e-6);
        assert_eq!(edge.truncate(), Vec3::ZERO);
    }

    #[test]
    fn test_ambient_darken_blocked_keeps_floor() {
        let c = compositor(CompositingPolicy::AmbientDarken);
        let blocked = c.compose(&params(), 0.0, true);
        assert!((blocked.w - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_capped_darken_never_exceeds_cap() {
        let c = compositor(CompositingPolicy::CappedDarken);
        let dark = c.compose(&params(), 500.0, false);
        assert!((dark.w - 0.6).abs() < 1e-6);
        let blocked = c.compose(&params(), 0.0, true);
        assert!((blocked.w - 0.6).abs() < 1e-6);
        let lit = c.compose(&params(), 0.0, false);
        assert_eq!(lit.w, 0.0);
    }

    #[test]
    fn test_additive_cutoff() {
        let c = compositor(CompositingPolicy::AdditiveColoredCutoff);
        assert_eq!(c.compose(&params(), 100.5, false), Vec4::ZERO);
        assert_eq!(c.compose(&params(), 10.0, true), Vec4::ZERO);
        let centre = c.compose(&params(), 0.0, false);
        assert_eq!(centre, Vec4::new(1.0, 0.5, 0.25, 1.0));
    }

    #[test]
    fn test_additive_scales_by_visibility_and_intensity() {
        let c = compositor(CompositingPolicy::AdditiveColoredCutoff);
        let p = LightParams {
            intensity: 2.0,
            visibility: 0.25,
            ..params()
        };
        let half = c.compose(&p, 50.0, false);
        // falloff 0.5 * 2.0 * 0.25 = 0.25
        assert!((half.x - 0.25).abs() < 1e-6);
        assert!((half.y - 0.125).abs() < 1e-6);
        assert!((half.w - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_infinite_intensity_keeps_ambient_floor() {
        let p = LightParams {
            intensity: f32::INFINITY,
            ..params()
        };
        let darken = compositor(CompositingPolicy::AmbientDarken);
        assert!((darken.compose(&p, 100.0, false).w - 0.9).abs() < 1e-6);
        assert!((darken.compose(&p, 250.0, false).w - 0.9).abs() < 1e-6);
        assert_eq!(darken.compose(&p, 50.0, false).w, 0.0);

        let additive = compositor(CompositingPolicy::AdditiveColoredCutoff);
        assert_eq!(additive.compose(&p, 100.0, false), Vec4::ZERO);
        let near = additive.compose(&p, 50.0, false);
        assert!(near.is_finite(), "got {near}");
        let black = LightParams {
            color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            ..p
        };
        assert!(additive.compose(&black, 50.0, false).is_finite());
    }

    #[test]
    fn test_darken_alpha_range_for_hostile_params() {
        for policy in [CompositingPolicy::AmbientDarken, CompositingPolicy::CappedDarken] {
            let c = compositor(policy);
            let cap = policy.default_max_opacity();
            for (radius, intensity, visibility) in [
                (0.0, 1.0, 1.0),
                (-5.0, 10.0, 2.0),
                (f32::NAN, f32::NAN, f32::NAN),
                (100.0, -1.0, 0.5),
            ] {
                let p = LightParams {
                    radius,
                    intensity,
                    visibility,
                    ..params()
                };
                for d in [0.0, 50.0, 1000.0] {
                    let out = c.compose(&p, d, false);
                    assert_eq!(out.truncate(), Vec3::ZERO);
                    assert!(out.w >= 0.0 && out.w <= cap, "alpha {} for {policy:?}", out.w);
                }
            }
        }
    }
}
