//! Radial falloff shared by every compositing policy.

use lumina_core::math::{radial_closeness, smoothstep};

/// Smoothstep falloff: 1 at the light, 0 at or beyond `radius`.
pub fn falloff(d_px: f32, radius: f32) -> f32 {
    smoothstep(radial_closeness(d_px, radius))
}

/// Light reaching the pixel before ambient/visibility. Zero when blocked or
/// outside the radius, whatever the intensity.
pub fn light_amount(falloff: f32, intensity: f32, blocked: bool) -> f32 {
    if blocked || falloff <= 0.0 {
        return 0.0;
    }
    falloff * sanitize_intensity(intensity)
}

/// `clamp(ambient + light * visibility, 0, 1)` with visibility clamped to [0,1].
pub fn light_factor(ambient: f32, light: f32, visibility: f32) -> f32 {
    let v = (ambient + light * sanitize_visibility(visibility)).clamp(0.0, 1.0);
    if v.is_nan() {
        0.0
    } else {
        v
    }
}

/// NaN reads as 0; `+inf` saturates to `f32::MAX` so `0 * intensity` stays 0.
pub(crate) fn sanitize_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, f32::MAX)
    }
}

pub(crate) fn sanitize_visibility(visibility: f32) -> f32 {
    if visibility.is_nan() {
        0.0
    } else {
        visibility.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_falloff_boundaries() {
        assert_eq!(falloff(0.0, 100.0), 1.0);
        assert_eq!(falloff(100.0, 100.0), 0.0);
        assert_eq!(falloff(150.0, 100.0), 0.0);
        assert!((falloff(50.0, 100.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_falloff_degenerate_radius_is_dark() {
        assert_eq!(falloff(0.0, 0.0), 0.0);
        assert_eq!(falloff(3.0, -10.0), 0.0);
        assert_eq!(falloff(3.0, f32::NAN), 0.0);
    }

    #[test]
    fn test_blocked_light_is_zero() {
        assert_eq!(light_amount(1.0, 5.0, true), 0.0);
        assert_eq!(light_amount(0.7, 1.0, false), 0.7);
    }

    #[test]
    fn test_infinite_intensity_stays_finite() {
        assert_eq!(light_amount(falloff(100.0, 100.0), f32::INFINITY, false), 0.0);
        assert_eq!(light_amount(0.0, f32::INFINITY, false), 0.0);
        let lit = light_amount(0.5, f32::INFINITY, false);
        assert!(lit.is_finite() && lit > 0.0);
        assert_eq!(light_factor(0.1, lit, 1.0), 1.0);
        assert_eq!(sanitize_intensity(f32::INFINITY), f32::MAX);
        assert_eq!(sanitize_intensity(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_intensity_and_visibility_clamped() {
        assert_eq!(light_amount(1.0, -2.0, false), 0.0);
        assert_eq!(light_factor(0.0, 0.5, 3.0), 0.5);
        assert_eq!(light_factor(0.1, 0.5, -1.0), 0.1);
        assert_eq!(light_factor(0.1, 5.0, 1.0), 1.0);
        assert_eq!(light_factor(0.0, f32::NAN, 1.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_light_factor_non_increasing(
            radius in 1.0f32..1000.0,
            intensity in 0.0f32..4.0,
            visibility in 0.0f32..=1.0,
            ambient in 0.0f32..=0.5,
            a in 0.0f32..=1.0,
            b in 0.0f32..=1.0,
        ) {
            let (near, far) = if a <= b { (a * radius, b * radius) } else { (b * radius, a * radius) };
            let lf_near = light_factor(ambient, light_amount(falloff(near, radius), intensity, false), visibility);
            let lf_far = light_factor(ambient, light_amount(falloff(far, radius), intensity, false), visibility);
            prop_assert!(lf_near >= lf_far - 1e-6, "near {} < far {}", lf_near, lf_far);
        }

        #[test]
        fn prop_ambient_floor_beyond_radius(
            radius in 1.0f32..1000.0,
            extra in 0.0f32..1000.0,
            intensity in 0.0f32..4.0,
            ambient in 0.0f32..=1.0,
        ) {
            let lf = light_factor(ambient, light_amount(falloff(radius + extra, radius), intensity, false), 1.0);
            prop_assert_eq!(lf, ambient);
        }
    }
}
