//! Host-side driver for `LightParams::visibility`.
//!
//! A light is hidden from a viewer when it is too far away or when the
//! straight line between them crosses an occluder footprint. The result is a
//! hard 0/1 fade written into the params before the frame is shaded.

use glam::Vec2;
use lumina_core::constants::{MAX_VISIBLE_DISTANCE, OCCLUDER_SIZE};
use lumina_core::LightParams;

/// Axis-aligned occluder footprint in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccluderRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl OccluderRect {
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    /// True when segment `a → b` crosses any edge of the rectangle.
    /// A segment lying fully inside touches no edge and is not reported.
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        let c = self.corners();
        (0..4).any(|i| segments_intersect(a, b, c[i], c[(i + 1) % 4]))
    }
}

/// Proper or endpoint intersection of segments `p1 → p2` and `q1 → q2`.
/// Parallel segments never intersect.
pub fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let r = p2 - p1;
    let s = q2 - q1;
    let denom = r.perp_dot(s);
    if denom.abs() < f32::EPSILON {
        return false;
    }
    let t = (q1 - p1).perp_dot(s) / denom;
    let u = (q1 - p1).perp_dot(r) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Line-of-sight visibility rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOfSight {
    /// Lights further than this from the viewer are hidden.
    pub max_visible_distance: f32,
    /// Footprint of each occluder, centred on its position.
    pub occluder_size: Vec2,
}

impl Default for LineOfSight {
    fn default() -> Self {
        Self {
            max_visible_distance: MAX_VISIBLE_DISTANCE,
            occluder_size: Vec2::splat(OCCLUDER_SIZE),
        }
    }
}

impl LineOfSight {
    /// 1.0 when the light at `light_world` is visible from `viewer`, else 0.0.
    pub fn visibility(&self, viewer: Vec2, light_world: Vec2, occluders: &[Vec2]) -> f32 {
        if viewer.distance(light_world) > self.max_visible_distance {
            return 0.0;
        }
        let blocked = occluders.iter().any(|&center| {
            OccluderRect::from_center_size(center, self.occluder_size)
                .intersects_segment(viewer, light_world)
        });
        if blocked {
            0.0
        } else {
            1.0
        }
    }

    /// Recompute `params.visibility` for this frame. Returns the new value.
    pub fn update(&self, params: &mut LightParams, viewer: Vec2, occluders: &[Vec2]) -> f32 {
        let visibility = self.visibility(viewer, params.light_world_position(), occluders);
        if visibility != params.visibility {
            log::trace!(
                "Light at {:?} visibility {} -> {}",
                params.light_position,
                params.visibility,
                visibility
            );
        }
        params.visibility = visibility;
        visibility
    }
}
