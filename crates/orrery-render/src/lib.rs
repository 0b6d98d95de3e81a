//! wgpu rendering for the orrery: device and surface management, the fixed
//! camera, the instanced asteroid pipeline, the planet layer, and the compute
//! kernel that evaluates the same orbit WGSL for parity checks.

pub mod asteroids;
pub mod camera;
pub mod gpu;
pub mod kernel;
pub mod orbit_wgsl;
pub mod pass;
pub mod planets;
pub mod scene;
pub mod shader;
pub mod targets;

pub use asteroids::{AsteroidPipeline, FrameUniform, PaletteUniform};
pub use camera::{Camera, CameraUniform};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use kernel::{KernelError, OrbitKernel, PARITY_TOLERANCE, ParityReport};
pub use pass::{FrameEncoder, LOAD_FAILURE_RED, RenderPassBuilder, SPACE_BLACK};
pub use planets::{PlanetInstance, PlanetPipeline};
pub use scene::{FrameInput, SceneRenderer};
pub use shader::ShaderLibrary;
pub use targets::{DEPTH_FORMAT, RenderTargets};
