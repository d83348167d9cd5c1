//! Diagnostic overlays. These bypass the lighting algorithm entirely and are
//! only useful for checking that uv, params and the overlay blend are wired
//! correctly.

use glam::{Vec2, Vec4};
use lumina_core::math::{pixel_distance, radial_closeness};
use lumina_core::{DebugMode, LightParams, Rgba};

use crate::kernel::LightKernel;
use crate::sampler::OcclusionSampler;

/// Fixed diagnostic color for `mode`, or `None` when diagnostics are off.
pub fn diagnostic_color(mode: DebugMode, params: &LightParams, uv: Vec2) -> Option<Rgba> {
    match mode {
        DebugMode::Off => None,
        DebugMode::SolidOverlay => Some(Vec4::new(1.0, 0.0, 1.0, 0.5)),
        DebugMode::UvGradient => Some(Vec4::new(uv.x, uv.y, 0.0, 1.0)),
        DebugMode::ParamsAsColor => {
            let extent = params.mask_size.max_element();
            let reach = if extent > 0.0 {
                (params.radius / extent).clamp(0.0, 1.0)
            } else {
                0.0
            };
            Some(Vec4::new(
                params.light_position.x,
                params.light_position.y,
                reach,
                1.0,
            ))
        }
        DebugMode::RadialTest => {
            let d_px = pixel_distance(params.light_position, uv, params.mask_size);
            Some(Vec4::new(1.0, 1.0, 1.0, radial_closeness(d_px, params.radius)))
        }
    }
}

/// Entry point for one pixel: diagnostics if the params select one,
/// otherwise the light kernel.
pub fn shade<S>(kernel: &LightKernel, sampler: &S, params: &LightParams, uv: Vec2) -> Rgba
where
    S: OcclusionSampler + ?Sized,
{
    match diagnostic_color(params.debug_mode, params, uv) {
        Some(color) => color,
        None => kernel.evaluate(sampler, params, uv),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumina_core::KernelConfig;

    fn params(mode: DebugMode) -> LightParams {
        LightParams {
            light_position: Vec2::new(0.25, 0.75),
            radius: 128.0,
            mask_size: Vec2::new(512.0, 256.0),
            debug_mode: mode,
            ..LightParams::default()
        }
    }

    #[test]
    fn test_off_runs_kernel() {
        let kernel = LightKernel::new(&KernelConfig::default());
        let p = params(DebugMode::Off);
        let empty = |_: Vec2| 0.0_f32;
        let uv = Vec2::new(0.3, 0.7);
        assert_eq!(shade(&kernel, &empty, &p, uv), kernel.evaluate(&empty, &p, uv));
    }

    #[test]
    fn test_diagnostics_skip_sampler() {
        let kernel = LightKernel::new(&KernelConfig::default());
        let panicking = |_: Vec2| -> f32 { panic!("diagnostics must not sample occlusion") };
        for mode in [
            DebugMode::SolidOverlay,
            DebugMode::UvGradient,
            DebugMode::ParamsAsColor,
            DebugMode::RadialTest,
        ] {
            let out = shade(&kernel, &panicking, &params(mode), Vec2::new(0.9, 0.1));
            assert!(out.is_finite());
        }
    }

    #[test]
    fn test_pattern_values() {
        let uv = Vec2::new(0.1, 0.6);
        assert_eq!(
            diagnostic_color(DebugMode::UvGradient, &params(DebugMode::UvGradient), uv),
            Some(Vec4::new(0.1, 0.6, 0.0, 1.0))
        );
        assert_eq!(
            diagnostic_color(DebugMode::ParamsAsColor, &params(DebugMode::ParamsAsColor), uv),
            Some(Vec4::new(0.25, 0.75, 0.25, 1.0))
        );
        let p = params(DebugMode::RadialTest);
        let at_light = diagnostic_color(DebugMode::RadialTest, &p, p.light_position).unwrap();
        assert_eq!(at_light.w, 1.0);
        let far = diagnostic_color(DebugMode::RadialTest, &p, Vec2::new(1.0, 0.0)).unwrap();
        assert_eq!(far.w, 0.0);
    }
}
