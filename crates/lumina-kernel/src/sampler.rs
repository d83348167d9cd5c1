//! Occlusion mask storage and sampling.
//!
//! The kernel only sees the [`OcclusionSampler`] capability. Filtering and
//! edge addressing belong to the sampler, mirroring how the GPU path binds a
//! texture together with a `wgpu::Sampler`.

use glam::Vec2;
use lumina_core::config::{AddressMode, FilterMode};
use lumina_core::{LuminaError, SamplerConfig};

/// Read-only opacity lookup at a normalized coordinate. Never fails; returns
/// a value in [0,1] for any input, out-of-range coordinates included.
pub trait OcclusionSampler {
    fn sample(&self, coord: Vec2) -> f32;
}

impl<F> OcclusionSampler for F
where
    F: Fn(Vec2) -> f32,
{
    fn sample(&self, coord: Vec2) -> f32 {
        self(coord)
    }
}

/// Single-channel occlusion field, row-major, one `f32` per texel.
#[derive(Debug, Clone, PartialEq)]
pub struct OcclusionMask {
    width: u32,
    height: u32,
    texels: Vec<f32>,
    sampler: SamplerConfig,
}

impl OcclusionMask {
    /// Fully transparent mask (no occluders).
    pub fn new(width: u32, height: u32) -> Result<Self, LuminaError> {
        if width == 0 || height == 0 {
            return Err(LuminaError::EmptyMask { width, height });
        }
        Ok(Self {
            width,
            height,
            texels: vec![0.0; width as usize * height as usize],
            sampler: SamplerConfig::default(),
        })
    }

    /// Wrap existing texels. Values are clamped to [0,1].
    pub fn from_texels(width: u32, height: u32, mut texels: Vec<f32>) -> Result<Self, LuminaError> {
        if width == 0 || height == 0 {
            return Err(LuminaError::EmptyMask { width, height });
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(LuminaError::MaskSizeMismatch {
                expected,
                actual: texels.len(),
            });
        }
        for t in &mut texels {
            *t = if t.is_nan() { 0.0 } else { (*t).clamp(0.0, 1.0) };
        }
        Ok(Self {
            width,
            height,
            texels,
            sampler: SamplerConfig::default(),
        })
    }

    /// Build from one byte per texel (e.g. an `R8Unorm` readback).
    pub fn from_r8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, LuminaError> {
        let texels = bytes.iter().map(|&b| b as f32 / 255.0).collect();
        Self::from_texels(width, height, texels)
    }

    /// Build from RGBA8 pixels using the red channel, as the occlusion camera
    /// renders occluders white on black.
    pub fn from_rgba8(width: u32, height: u32, bytes: &[u8]) -> Result<Self, LuminaError> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(LuminaError::MaskSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        let texels = bytes.chunks_exact(4).map(|px| px[0] as f32 / 255.0).collect();
        Self::from_texels(width, height, texels)
    }

    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn set_sampler(&mut self, sampler: SamplerConfig) {
        self.sampler = sampler;
    }

    pub fn sampler(&self) -> SamplerConfig {
        self.sampler
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resolution in pixels, as carried in `LightParams::mask_size`.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn texels(&self) -> &[f32] {
        &self.texels
    }

    /// Texel at integer coordinates. Panics when out of bounds.
    pub fn texel(&self, x: u32, y: u32) -> f32 {
        self.texels[self.index(x, y)]
    }

    pub fn fill(&mut self, value: f32) {
        self.texels.fill(value.clamp(0.0, 1.0));
    }

    /// Stamp `value` into every texel whose centre lies inside the uv
    /// rectangle `[min, max)`. Used to rasterize rectangular occluders.
    pub fn fill_rect_uv(&mut self, min: Vec2, max: Vec2, value: f32) {
        let value = value.clamp(0.0, 1.0);
        let (w, h) = (self.width as f32, self.height as f32);
        let x0 = ((min.x * w - 0.5).ceil().max(0.0)) as u32;
        let y0 = ((min.y * h - 0.5).ceil().max(0.0)) as u32;
        let x1 = ((max.x * w - 0.5).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((max.y * h - 0.5).ceil().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = self.index(x, y);
                self.texels[idx] = value;
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "texel ({x}, {y}) out of bounds");
        y as usize * self.width as usize + x as usize
    }

    /// Resolve an integer texel coordinate through the address mode.
    fn address(&self, i: i64, extent: u32) -> u32 {
        let n = extent as i64;
        match self.sampler.address {
            AddressMode::ClampToEdge => i.clamp(0, n - 1) as u32,
            AddressMode::Repeat => i.rem_euclid(n) as u32,
        }
    }

    fn fetch(&self, x: i64, y: i64) -> f32 {
        let x = self.address(x, self.width);
        let y = self.address(y, self.height);
        self.texels[y as usize * self.width as usize + x as usize]
    }
}

impl OcclusionSampler for OcclusionMask {
    fn sample(&self, coord: Vec2) -> f32 {
        let px = coord * self.size();
        match self.sampler.filter {
            FilterMode::Nearest => self.fetch(px.x.floor() as i64, px.y.floor() as i64),
            FilterMode::Linear => {
                // Texel centres sit at half-integer coordinates
                let p = px - Vec2::splat(0.5);
                let base = p.floor();
                let f = p - base;
                let (x0, y0) = (base.x as i64, base.y as i64);
                let top = self.fetch(x0, y0) * (1.0 - f.x) + self.fetch(x0 + 1, y0) * f.x;
                let bottom =
                    self.fetch(x0, y0 + 1) * (1.0 - f.x) + self.fetch(x0 + 1, y0 + 1) * f.x;
                (top * (1.0 - f.y) + bottom * f.y).clamp(0.0, 1.0)
            }
        }
    }
}
