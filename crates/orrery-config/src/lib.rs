//! Configuration for the orrery viewer.
//!
//! Settings persist to disk as RON (`config.ron`) and every section falls back
//! to defaults when missing, so older files keep loading. CLI flags override
//! the loaded values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DataConfig, DebugConfig, PickingConfig, Quality, RenderConfig, SimulationConfig,
    WindowConfig,
};
pub use error::ConfigError;
