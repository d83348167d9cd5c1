use glam::Vec2;

/// Cubic Hermite ease: 3t² − 2t³ for t clamped to [0, 1].
/// Zero derivative at both ends.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Aspect-correct distance in mask pixels between two normalized coordinates.
///
/// Scaling the uv delta by the mask resolution keeps lights circular on
/// non-square masks.
pub fn pixel_distance(from: Vec2, to: Vec2, mask_size: Vec2) -> f32 {
    ((to - from) * mask_size).length()
}

/// Normalized closeness to the light: 1 at the centre, 0 at or past `radius`.
/// A non-positive or non-finite radius counts as fully outside.
pub fn radial_closeness(d_px: f32, radius: f32) -> f32 {
    if !radius.is_finite() || radius <= 0.0 {
        return 0.0;
    }
    let ratio = d_px / radius;
    if ratio.is_nan() {
        return 0.0;
    }
    1.0 - ratio.clamp(0.0, 1.0)
}

/// Normalized coordinate of the centre of pixel `(x, y)` in a `width × height` grid.
pub fn pixel_center_uv(x: u32, y: u32, width: u32, height: u32) -> Vec2 {
    Vec2::new(
        (x as f32 + 0.5) / width.max(1) as f32,
        (y as f32 + 0.5) / height.max(1) as f32,
    )
}
