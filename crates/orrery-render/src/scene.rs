//! Frame-level composition: one pass drawing planets, then asteroids.

use orrery_catalog::BodyCatalog;
use wgpu::util::DeviceExt;

use crate::asteroids::AsteroidPipeline;
use crate::camera::Camera;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, LOAD_FAILURE_RED, RenderPassBuilder};
use crate::planets::PlanetPipeline;
use crate::shader::ShaderLibrary;
use crate::targets::RenderTargets;

/// What one frame should show.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    /// Simulation time in days.
    pub time_days: f64,
    /// Catalog prefix to draw.
    pub drawn: usize,
}

/// Everything drawn each frame, sharing one camera uniform.
pub struct SceneRenderer {
    shaders: ShaderLibrary,
    camera_buffer: wgpu::Buffer,
    targets: RenderTargets,
    planets: PlanetPipeline,
    /// `None` when the catalog failed to load.
    asteroids: Option<AsteroidPipeline>,
    clear_color: wgpu::Color,
}

impl SceneRenderer {
    /// `requested_samples` is clamped to what the adapter supports.
    pub fn new(
        ctx: &RenderContext,
        catalog: Option<&BodyCatalog>,
        camera: &Camera,
        requested_samples: u32,
        size_scale: f32,
        clear_color: wgpu::Color,
    ) -> Self {
        let sample_count = ctx.supported_sample_count(requested_samples);
        if sample_count != requested_samples {
            log::warn!("{requested_samples}x MSAA unsupported, using {sample_count}x");
        }

        let mut shaders = ShaderLibrary::new();
        let camera_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("camera-uniform"),
                contents: bytemuck::bytes_of(&camera.to_uniform()),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let (width, height) = ctx.size();
        let targets = RenderTargets::new(&ctx.device, ctx.surface_format, width, height, sample_count);
        let planets = PlanetPipeline::new(&ctx.device, &camera_buffer, ctx.surface_format, sample_count);
        let asteroids = catalog.map(|catalog| {
            AsteroidPipeline::new(
                &ctx.device,
                &mut shaders,
                &camera_buffer,
                ctx.surface_format,
                sample_count,
                catalog,
                size_scale,
            )
        });

        // A missing asteroid layer is shown, not hidden.
        let clear_color = if asteroids.is_some() {
            clear_color
        } else {
            LOAD_FAILURE_RED
        };

        Self {
            shaders,
            camera_buffer,
            targets,
            planets,
            asteroids,
            clear_color,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.targets.resize(device, width, height);
    }

    /// Switch MSAA, rebuilding targets and pipelines. Returns the count
    /// actually used.
    pub fn set_sample_count(&mut self, ctx: &RenderContext, requested: u32) -> u32 {
        let sample_count = ctx.supported_sample_count(requested);
        if sample_count == self.targets.sample_count() {
            return sample_count;
        }
        self.targets.set_sample_count(&ctx.device, sample_count);
        self.planets.set_sample_count(&ctx.device, sample_count);
        if let Some(asteroids) = self.asteroids.as_mut() {
            asteroids.set_sample_count(&ctx.device, sample_count);
        }
        log::info!("MSAA set to {sample_count}x");
        sample_count
    }

    pub fn sample_count(&self) -> u32 {
        self.targets.sample_count()
    }

    pub fn has_asteroids(&self) -> bool {
        self.asteroids.is_some()
    }

    /// Mutable access so other GPU passes (the parity kernel) reuse the
    /// compiled orbit modules.
    pub fn shaders_mut(&mut self) -> &mut ShaderLibrary {
        &mut self.shaders
    }

    /// Upload per-frame data and draw. A timed-out surface skips the frame.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        camera: &Camera,
        input: FrameInput,
    ) -> Result<(), SurfaceError> {
        let surface_texture = match ctx.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        ctx.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera.to_uniform()),
        );
        self.planets.update(&ctx.queue, input.time_days);
        if let Some(asteroids) = self.asteroids.as_mut() {
            asteroids.update(&ctx.queue, input.time_days, input.drawn);
        }

        let builder = RenderPassBuilder::new()
            .clear_color(self.clear_color)
            .label("scene-pass");
        let mut frame = FrameEncoder::new(&ctx.device, &ctx.queue, surface_texture);
        if let Some(mut pass) = frame.begin_render_pass(&builder, &self.targets) {
            // Opaque planets first so their depth occludes asteroids behind them.
            self.planets.render(&mut pass);
            if let Some(asteroids) = self.asteroids.as_ref() {
                asteroids.render(&mut pass);
            }
        }
        frame.submit();
        Ok(())
    }
}
