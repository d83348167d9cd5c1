use glam::Vec2;
use lumina_core::constants::{DEFAULT_MASK_SIZE, OCCLUDER_SIZE};
use lumina_core::LuminaError;
use lumina_kernel::OcclusionMask;

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    pub occluder_count: u32,
    pub overlay_width: u32,
    pub overlay_height: u32,
    pub mask_size: u32,
}

/// Return the standard suite of benchmark scenes (empty to 512 occluders),
/// all at 1280x720 over the default mask.
pub fn standard_scenes() -> Vec<SceneConfig> {
    [("empty", 0), ("sparse", 16), ("medium", 64), ("dense", 192), ("packed", 512)]
        .into_iter()
        .map(|(name, occluder_count)| SceneConfig {
            name,
            occluder_count,
            overlay_width: 1280,
            overlay_height: 720,
            mask_size: DEFAULT_MASK_SIZE,
        })
        .collect()
}

/// Deterministic occluder centres in world space (origin at the mask centre,
/// one world unit per mask pixel). A clear disc around the origin is kept so
/// the orbiting light is never fully buried.
///
/// Cells of the `mask_size²` grid are visited once each along a stride
/// coprime with the cell count, so positions never repeat. Masks too small
/// to fit `occluder_count` cells outside the clear disc yield fewer.
pub fn occluder_positions(config: &SceneConfig) -> Vec<Vec2> {
    let span = config.mask_size as u64;
    let cells = span * span;
    let half = config.mask_size as f32 / 2.0;
    let clear_radius = OCCLUDER_SIZE * 1.5;
    let wanted = config.occluder_count as usize;

    let mut stride = PLACEMENT_STRIDE;
    while cells > 1 && gcd(stride, cells) != 1 {
        stride += 1;
    }

    let mut positions = Vec::with_capacity(wanted);
    for k in 0..cells {
        if positions.len() == wanted {
            break;
        }
        let cell = (k * stride + PLACEMENT_OFFSET) % cells;
        let p = Vec2::new((cell % span) as f32 - half, (cell / span) as f32 - half);
        if p.length() > clear_radius {
            positions.push(p);
        }
    }
    if positions.len() < wanted {
        log::warn!(
            "Scene '{}': only {} of {} occluders fit a {}px mask",
            config.name,
            positions.len(),
            wanted,
            config.mask_size
        );
    }
    positions
}

const PLACEMENT_STRIDE: u64 = 7919;
const PLACEMENT_OFFSET: u64 = 31337;

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Rasterize the occluders into a square mask of `config.mask_size`.
pub fn generate_occlusion_mask(
    config: &SceneConfig,
    occluders: &[Vec2],
) -> Result<OcclusionMask, LuminaError> {
    let mut mask = OcclusionMask::new(config.mask_size, config.mask_size)?;
    let size = mask.size();
    let half_extent = Vec2::splat(OCCLUDER_SIZE / 2.0);
    for &center in occluders {
        let pixel = center + size / 2.0;
        mask.fill_rect_uv((pixel - half_extent) / size, (pixel + half_extent) / size, 1.0);
    }
    Ok(mask)
}
