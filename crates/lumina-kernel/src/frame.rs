//! CPU evaluation of a whole light overlay.
//! Rows are independent, so they are shaded in parallel on the rayon pool;
//! the mask and params are shared read-only across workers.

use glam::Vec4;
use lumina_core::math::pixel_center_uv;
use lumina_core::{LightParams, Rgba};
use rayon::prelude::*;

use crate::debug::shade;
use crate::kernel::LightKernel;
use crate::sampler::OcclusionSampler;

/// Row-major RGBA overlay, one `Vec4` per output pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct LightFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl LightFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Quantize to RGBA8 (each channel clamped to [0,1]).
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| {
                p.clamp(Vec4::ZERO, Vec4::ONE)
                    .to_array()
                    .map(|c| (c * 255.0).round() as u8)
            })
            .collect()
    }

    /// Number of pixels with non-zero alpha.
    pub fn covered_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.w > 0.0).count()
    }
}

/// Shade every pixel of a `width × height` overlay into `frame`, reusing its
/// allocation when the size already matches.
pub fn render_into<S>(
    frame: &mut LightFrame,
    kernel: &LightKernel,
    sampler: &S,
    params: &LightParams,
    width: u32,
    height: u32,
) where
    S: OcclusionSampler + Sync + ?Sized,
{
    let len = width as usize * height as usize;
    if frame.width != width || frame.height != height || frame.pixels.len() != len {
        log::debug!(
            "Resizing light frame {}x{} -> {}x{}",
            frame.width,
            frame.height,
            width,
            height
        );
        *frame = LightFrame::new(width, height);
    }
    if len == 0 {
        return;
    }

    frame
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                let uv = pixel_center_uv(x as u32, y as u32, width, height);
                *px = shade(kernel, sampler, params, uv);
            }
        });
}

/// Shade a fresh overlay.
pub fn render_frame<S>(
    kernel: &LightKernel,
    sampler: &S,
    params: &LightParams,
    width: u32,
    height: u32,
) -> LightFrame
where
    S: OcclusionSampler + Sync + ?Sized,
{
    let mut frame = LightFrame::new(width, height);
    render_into(&mut frame, kernel, sampler, params, width, height);
    frame
}
