//! Command-line argument parsing for the orrery viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, Quality};

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Real-time asteroid and comet orbit viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Binary orbital element catalog.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// JSON metadata matching the catalog.
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Render quality.
    #[arg(long, value_enum)]
    pub quality: Option<Quality>,

    /// Initial speed multiplier.
    #[arg(long)]
    pub speed: Option<f64>,

    /// Start with the simulation paused.
    #[arg(long)]
    pub paused: bool,

    /// Generate a deterministic synthetic catalog of N bodies instead of
    /// reading data files.
    #[arg(long, value_name = "N")]
    pub synthetic: Option<usize>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Compare GPU and host orbit positions at startup.
    #[arg(long)]
    pub verify_parity: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref path) = args.catalog {
            self.data.catalog_path = path.clone();
        }
        if let Some(ref path) = args.metadata {
            self.data.metadata_path = path.clone();
        }
        if let Some(quality) = args.quality {
            self.render.quality = quality;
        }
        if let Some(speed) = args.speed {
            self.simulation.initial_speed = speed;
        }
        if args.paused {
            self.simulation.start_paused = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if args.verify_parity {
            self.debug.verify_gpu_parity = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            catalog: Some(PathBuf::from("belt.bin")),
            quality: Some(Quality::Low),
            speed: Some(10.0),
            paused: true,
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.data.catalog_path, PathBuf::from("belt.bin"));
        assert_eq!(config.render.quality, Quality::Low);
        assert_eq!(config.simulation.initial_speed, 10.0);
        assert!(config.simulation.start_paused);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert!(!config.debug.verify_gpu_parity);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "orrery",
            "--quality",
            "low",
            "--synthetic",
            "500",
            "--verify-parity",
        ])
        .unwrap();
        assert_eq!(args.quality, Some(Quality::Low));
        assert_eq!(args.synthetic, Some(500));
        assert!(args.verify_parity);
        assert!(!args.paused);
    }
}
