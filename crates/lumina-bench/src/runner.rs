use std::time::Instant;

use glam::Vec2;
use lumina_core::{KernelConfig, LightParams, LuminaError};
use lumina_kernel::frame::render_into;
use lumina_kernel::{LightFrame, LightKernel, LineOfSight, OcclusionMask};
use lumina_render::LightPass;

use crate::scenes::{self, SceneConfig};

/// Timing data for a single benchmark run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimingSeries {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

/// Result of a single scene benchmark.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BenchmarkResult {
    pub scene_name: String,
    pub backend: String,
    pub preset: String,
    pub occluders: u32,
    pub resolution: [u32; 2],
    pub frame_count: u32,
    pub timings: TimingSeries,
}

struct GpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

/// Times the light overlay per scene, on the rayon CPU evaluator by default
/// or on the wgpu light pass after [`BenchmarkRunner::with_gpu`].
pub struct BenchmarkRunner {
    frame_count: u32,
    preset: String,
    config: KernelConfig,
    gpu: Option<GpuContext>,
}

impl BenchmarkRunner {
    pub fn new(frame_count: u32, preset: &str, config: KernelConfig) -> Self {
        Self {
            frame_count,
            preset: preset.to_string(),
            config,
            gpu: None,
        }
    }

    /// Initialize wgpu natively. Blocks on async adapter request.
    pub fn with_gpu(mut self) -> Result<Self, LuminaError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| LuminaError::AdapterNotFound("no adapter on primary backends".into()))?;

        log::info!("Benchmark adapter: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("bench-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .map_err(|e| LuminaError::DeviceRequestFailed(e.to_string()))?;

        self.gpu = Some(GpuContext { device, queue });
        Ok(self)
    }

    pub fn backend(&self) -> &'static str {
        if self.gpu.is_some() {
            "gpu"
        } else {
            "cpu"
        }
    }

    /// Run a single benchmark scene and return timing results.
    pub fn run_scene(&self, config: &SceneConfig) -> Result<BenchmarkResult, LuminaError> {
        log::info!(
            "Running scene '{}' ({} occluders, {}x{}, {})...",
            config.name,
            config.occluder_count,
            config.overlay_width,
            config.overlay_height,
            self.backend()
        );

        let occluders = scenes::occluder_positions(config);
        let mask = scenes::generate_occlusion_mask(config, &occluders)?;
        let line_of_sight = LineOfSight::default();

        let frame_times = match &self.gpu {
            Some(gpu) => self.time_gpu(gpu, config, &mask, &occluders, &line_of_sight)?,
            None => self.time_cpu(config, &mask, &occluders, &line_of_sight),
        };

        let timings = compute_timings(&frame_times);
        log::info!(
            "  Done: mean={:.2}ms, p95={:.2}ms, p99={:.2}ms",
            timings.mean_ms,
            timings.p95_ms,
            timings.p99_ms
        );

        Ok(BenchmarkResult {
            scene_name: config.name.to_string(),
            backend: self.backend().to_string(),
            preset: self.preset.clone(),
            occluders: config.occluder_count,
            resolution: [config.overlay_width, config.overlay_height],
            frame_count: self.frame_count,
            timings,
        })
    }

    fn time_cpu(
        &self,
        config: &SceneConfig,
        mask: &OcclusionMask,
        occluders: &[Vec2],
        line_of_sight: &LineOfSight,
    ) -> Vec<f64> {
        let kernel = LightKernel::new(&self.config);
        let mask = &cpu_mask(&kernel, mask);
        let mut frame = LightFrame::new(config.overlay_width, config.overlay_height);
        let mut frame_times = Vec::with_capacity(self.frame_count as usize);

        for i in 0..self.frame_count {
            let params = frame_params(i, mask, occluders, line_of_sight);
            let frame_start = Instant::now();
            render_into(
                &mut frame,
                &kernel,
                mask,
                &params,
                config.overlay_width,
                config.overlay_height,
            );
            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);
        }
        log::debug!("  Last frame covered {} pixels", frame.covered_pixels());
        frame_times
    }

    fn time_gpu(
        &self,
        gpu: &GpuContext,
        config: &SceneConfig,
        mask: &OcclusionMask,
        occluders: &[Vec2],
        line_of_sight: &LineOfSight,
    ) -> Result<Vec<f64>, LuminaError> {
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let mut pass = LightPass::new(
            &gpu.device,
            format,
            config.overlay_width,
            config.overlay_height,
            &self.config,
        );
        pass.upload_occlusion(&gpu.device, &gpu.queue, mask)?;
        let surface_view = dummy_surface_view(
            &gpu.device,
            format,
            config.overlay_width,
            config.overlay_height,
        );

        let mut frame_times = Vec::with_capacity(self.frame_count as usize);
        for i in 0..self.frame_count {
            let params = frame_params(i, mask, occluders, line_of_sight);
            let frame_start = Instant::now();

            pass.update_params(&gpu.queue, &params);
            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("bench-encoder"),
                });
            pass.encode(&mut encoder, &surface_view);
            gpu.queue.submit(std::iter::once(encoder.finish()));
            gpu.device.poll(wgpu::Maintain::Wait);

            frame_times.push(frame_start.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(frame_times)
    }
}

/// Copy of the scene mask filtered the way the kernel's config asks, matching
/// the sampler the GPU path binds.
fn cpu_mask(kernel: &LightKernel, mask: &OcclusionMask) -> OcclusionMask {
    let mut mask = mask.clone();
    kernel.configure_mask(&mut mask);
    mask
}

/// Light parameters for frame `index`: the light orbits the mask centre and
/// its visibility is driven from a viewer at the world origin.
pub fn frame_params(
    index: u32,
    mask: &OcclusionMask,
    occluders: &[Vec2],
    line_of_sight: &LineOfSight,
) -> LightParams {
    let angle = index as f32 * 0.05;
    let mut params = LightParams {
        light_position: Vec2::splat(0.5) + 0.3 * Vec2::new(angle.cos(), angle.sin()),
        mask_size: mask.size(),
        ..LightParams::default()
    };
    line_of_sight.update(&mut params, Vec2::ZERO, occluders);
    params
}

/// Create a dummy texture view for the composite pass (bench doesn't present to screen).
fn dummy_surface_view(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("bench-dummy-surface"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Compute timing statistics from a list of frame times in milliseconds.
pub fn compute_timings(times: &[f64]) -> TimingSeries {
    if times.is_empty() {
        return TimingSeries {
            mean_ms: 0.0,
            median_ms: 0.0,
            p95_ms: 0.0,
            p99_ms: 0.0,
            min_ms: 0.0,
            max_ms: 0.0,
        };
    }

    let mut sorted = times.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    };
    let p95_idx = ((n as f64) * 0.95).ceil() as usize;
    let p99_idx = ((n as f64) * 0.99).ceil() as usize;

    TimingSeries {
        mean_ms: mean,
        median_ms: median,
        p95_ms: sorted[p95_idx.min(n - 1)],
        p99_ms: sorted[p99_idx.min(n - 1)],
        min_ms: sorted[0],
        max_ms: sorted[n - 1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenes::{occluder_positions, standard_scenes};

    #[test]
    fn test_compute_timings_empty() {
        let t = compute_timings(&[]);
        assert_eq!(t.mean_ms, 0.0);
        assert_eq!(t.max_ms, 0.0);
    }

    #[test]
    fn test_compute_timings_stats() {
        let t = compute_timings(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(t.mean_ms, 2.5);
        assert_eq!(t.median_ms, 2.5);
        assert_eq!(t.min_ms, 1.0);
        assert_eq!(t.max_ms, 4.0);
        assert_eq!(t.p95_ms, 4.0);
    }

    #[test]
    fn test_compute_timings_odd_median() {
        let t = compute_timings(&[5.0, 1.0, 3.0]);
        assert_eq!(t.median_ms, 3.0);
    }

    #[test]
    fn test_cpu_mask_follows_preset_sampler() {
        let config = &standard_scenes()[1];
        let mask = scenes::generate_occlusion_mask(config, &occluder_positions(config)).unwrap();
        for name in lumina_presets::BUILTIN_PRESET_NAMES {
            let preset = lumina_presets::load_builtin(name).unwrap().unwrap();
            let kernel = LightKernel::new(&preset);
            assert_eq!(cpu_mask(&kernel, &mask).sampler(), preset.sampler, "preset {name}");
        }
    }

    #[test]
    fn test_frame_params_follow_mask_and_orbit() {
        let config = &standard_scenes()[0];
        let mask = scenes::generate_occlusion_mask(config, &[]).unwrap();
        let params = frame_params(0, &mask, &[], &LineOfSight::default());
        assert_eq!(params.mask_size, Vec2::splat(512.0));
        assert!((params.light_position - Vec2::new(0.8, 0.5)).length() < 1e-6);
        // Light is ~154 units from the origin viewer with nothing in between
        assert_eq!(params.visibility, 1.0);
    }

    #[test]
    fn test_cpu_run_scene_reports_every_frame() {
        let config = SceneConfig {
            name: "tiny",
            occluder_count: 4,
            overlay_width: 32,
            overlay_height: 24,
            mask_size: 128,
        };
        let runner = BenchmarkRunner::new(3, "quality", KernelConfig::default());
        assert_eq!(runner.backend(), "cpu");
        let result = runner.run_scene(&config).unwrap();
        assert_eq!(result.scene_name, "tiny");
        assert_eq!(result.backend, "cpu");
        assert_eq!(result.frame_count, 3);
        assert_eq!(result.resolution, [32, 24]);
        assert!(result.timings.min_ms <= result.timings.max_ms);
    }
}
