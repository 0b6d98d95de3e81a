//! Window creation and event handling via winit.
//!
//! [`OrreryApp`] implements winit's [`ApplicationHandler`]. Each redraw it
//! applies the frame's key commands and clicks, advances the simulation clock
//! and renders the scene at the new time.

use std::sync::Arc;

use glam::Vec2;
use orrery_catalog::BodyCatalog;
use orrery_config::Config;
use orrery_input::{Command, InputState};
use orrery_render::{
    Camera, FrameInput, OrbitKernel, PARITY_TOLERANCE, ParityReport, RenderContext,
    SceneRenderer, SurfaceError, init_render_context_blocking,
};
use orrery_sim::{Engine, SelectionChange};
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::frame_stats::FrameStats;

/// Records sampled by the startup GPU parity check.
const PARITY_SAMPLES: usize = 1024;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

fn clear_color_from_config(config: &Config) -> wgpu::Color {
    let [r, g, b, a] = config.render.clear_color;
    wgpu::Color { r, g, b, a }
}

/// Window title reflecting the current selection.
fn title_for(base: &str, change: &SelectionChange) -> Option<String> {
    match change {
        SelectionChange::Selected(obj) => Some(format!("{base} | {} ({})", obj.name, obj.class)),
        SelectionChange::ClearedByMiss | SelectionChange::ClearedByUser => Some(base.to_string()),
        SelectionChange::Unchanged => None,
    }
}

pub struct OrreryApp {
    config: Config,
    engine: Engine,
    camera: Camera,
    input: InputState,
    frame_stats: FrameStats,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    scene: Option<SceneRenderer>,
}

impl OrreryApp {
    pub fn new(config: Config, engine: Engine) -> Self {
        Self {
            input: InputState::new(config.picking.click_drag_tolerance_px),
            frame_stats: FrameStats::new(config.debug.fps_log_interval_s),
            camera: Camera::default(),
            window: None,
            gpu: None,
            scene: None,
            engine,
            config,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Physical surface size, zero before the window exists.
    fn viewport(&self) -> Vec2 {
        self.gpu.as_ref().map_or(Vec2::ZERO, |gpu| {
            let (w, h) = gpu.size();
            Vec2::new(w as f32, h as f32)
        })
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        // Minimized windows report 0x0; keep the last good surface.
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(scene) = &mut self.scene {
                scene.resize(&gpu.device, width, height);
            }
        }
        info!("Window resized to {width}x{height}");
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::TogglePause => self.engine.toggle_pause(),
            Command::SpeedPreset(slot) => {
                self.engine.apply_speed_preset(slot);
            }
            Command::ToggleQuality => {
                let quality = self.engine.quality().toggled();
                self.engine.set_quality(quality);
                if let (Some(gpu), Some(scene)) = (&self.gpu, &mut self.scene) {
                    scene.set_sample_count(gpu, quality.msaa_samples());
                }
            }
            Command::ClearSelection => {
                let change = self.engine.clear_selection();
                self.show_selection(&change);
            }
        }
    }

    fn show_selection(&self, change: &SelectionChange) {
        if let (Some(window), Some(title)) =
            (&self.window, title_for(&self.config.window.title, change))
        {
            window.set_title(&title);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let tick = self.frame_stats.tick();

        for command in self.input.commands() {
            self.apply_command(command);
        }

        // Clicks pick against what was on screen, i.e. before the clock moves.
        let viewport = self.viewport();
        let clicks = self.input.clicks().to_vec();
        for click in clicks {
            if let Some(ray) = self.camera.ray_through_cursor(click, viewport) {
                let change = self.engine.click(&ray);
                self.show_selection(&change);
            }
        }

        self.engine.frame(tick.dt);

        if let Some(report) = tick.report {
            info!(
                fps = (report.fps * 10.0).round() / 10.0,
                tracked = self.engine.drawn_count(),
                paused = self.engine.clock().is_paused(),
                "Frame stats"
            );
        }

        if let (Some(gpu), Some(scene)) = (&self.gpu, &mut self.scene) {
            let input = FrameInput {
                time_days: self.engine.time(),
                drawn: self.engine.drawn_count(),
            };
            match scene.render(gpu, &self.camera, input) {
                Ok(()) => {}
                Err(SurfaceError::OutOfMemory) => {
                    error!("GPU out of memory, exiting");
                    event_loop.exit();
                    return;
                }
                Err(err) => warn!("Frame dropped: {err}"),
            }
        }

        self.input.end_frame();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Compare a sample of GPU kernel positions against the host evaluator.
fn verify_gpu_parity(gpu: &RenderContext, scene: &mut SceneRenderer, catalog: &BodyCatalog, t: f64) {
    let kernel = OrbitKernel::new(&gpu.device, scene.shaders_mut());
    match ParityReport::measure(
        &kernel,
        &gpu.device,
        &gpu.queue,
        catalog.records(),
        t,
        PARITY_SAMPLES,
    ) {
        Ok(report) if report.within(PARITY_TOLERANCE) => info!(
            samples = report.samples,
            max = report.max_deviation,
            mean = report.mean_deviation,
            "GPU orbit parity ok"
        ),
        Ok(report) => warn!(
            samples = report.samples,
            max = report.max_deviation,
            worst = ?report.worst_index,
            tolerance = PARITY_TOLERANCE,
            "GPU orbit positions diverge from host"
        ),
        Err(err) => warn!("GPU parity check failed: {err}"),
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let gpu = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let (width, height) = gpu.size();
        self.camera.set_aspect_ratio(width as f32, height as f32);

        let mut scene = SceneRenderer::new(
            &gpu,
            self.engine.catalog(),
            &self.camera,
            self.engine.quality().msaa_samples(),
            self.config.render.size_scale,
            clear_color_from_config(&self.config),
        );
        info!(
            "Renderer ready: {width}x{height}, {}x MSAA, asteroids {}",
            scene.sample_count(),
            if scene.has_asteroids() { "on" } else { "off" }
        );

        if self.config.debug.verify_gpu_parity
            && let Some(catalog) = self.engine.catalog()
        {
            verify_gpu_parity(&gpu, &mut scene, catalog, self.engine.time());
        }

        window.request_redraw();
        self.gpu = Some(gpu);
        self.scene = Some(scene);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(false) => self.input.keyboard.release_all(),
            WindowEvent::KeyboardInput { event, .. } => self.input.on_key(&event),
            WindowEvent::CursorMoved { position, .. } => {
                self.input.mouse.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.on_mouse_button(button, state);
            }
            WindowEvent::CursorEntered { .. } => self.input.mouse.on_cursor_entered(),
            WindowEvent::CursorLeft { .. } => self.input.mouse.on_cursor_left(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window is closed.
///
/// # Errors
///
/// Returns the event loop error if it cannot be created or fails while running.
#[instrument(skip_all)]
pub fn run(config: Config, engine: Engine) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = OrreryApp::new(config, engine);
    event_loop.run_app(&mut app)
}
