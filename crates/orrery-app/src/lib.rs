//! The orrery application: platform directories, frame timing, and the winit
//! event loop that ties input, simulation and rendering together.

pub mod frame_stats;
pub mod platform;
pub mod window;

pub use frame_stats::{FpsReport, FrameStats, FrameTick, MAX_FRAME_TIME};
pub use platform::{PlatformDirs, PlatformError};
pub use window::{OrreryApp, run, window_attributes_from_config};
