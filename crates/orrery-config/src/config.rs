//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Simulation clock settings.
    pub simulation: SimulationConfig,
    /// Click-to-identify settings.
    pub picking: PickingConfig,
    /// Catalog file locations.
    pub data: DataConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Render quality level.
///
/// Only the drawn instance count and the antialiasing sample count depend on
/// it; orbit evaluation is identical at every level.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Quality {
    /// 4× MSAA, every catalog body drawn.
    #[default]
    High,
    /// No MSAA, body count capped at `low_quality_instance_cap`.
    Low,
}

impl Quality {
    /// The other level.
    pub fn toggled(self) -> Self {
        match self {
            Quality::High => Quality::Low,
            Quality::Low => Quality::High,
        }
    }

    /// Requested MSAA sample count. The renderer may fall back to 1.
    pub fn msaa_samples(self) -> u32 {
        match self {
            Quality::High => 4,
            Quality::Low => 1,
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Starting quality level.
    pub quality: Quality,
    /// Maximum bodies drawn (and pickable) at [`Quality::Low`].
    pub low_quality_instance_cap: u32,
    /// Billboard size multiplier applied to `ln(diameter + 1)`.
    pub size_scale: f32,
    /// Background colour (linear RGBA).
    pub clear_color: [f64; 4],
}

/// Simulation clock configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated days per wall-clock second at speed 1.
    pub days_per_second: f64,
    /// Speed multiplier at startup.
    pub initial_speed: f64,
    /// Multipliers bound to keys `1`..`4`.
    pub speed_presets: Vec<f64>,
    /// Start with the clock paused.
    pub start_paused: bool,
}

/// Picking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PickingConfig {
    /// Maximum point-to-ray distance, in scene units, for an asteroid hit.
    pub threshold_scene_units: f32,
    /// Cursor travel in pixels between press and release still counted as a click.
    pub click_drag_tolerance_px: f32,
}

/// Catalog file locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Binary orbital element file (`9 × f32` per body).
    pub catalog_path: PathBuf,
    /// JSON metadata with `classes`, `ids`, `names`.
    pub metadata_path: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Seconds between FPS log lines. `0` disables them.
    pub fps_log_interval_s: f64,
    /// Compare GPU and host orbit evaluation at startup.
    pub verify_gpu_parity: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quality: Quality::High,
            low_quality_instance_cap: 6000,
            size_scale: 2.4,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days_per_second: 50.0,
            initial_speed: 1.0,
            speed_presets: vec![1.0, 10.0, 50.0, 100.0],
            start_paused: false,
        }
    }
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            threshold_scene_units: 4.0,
            click_drag_tolerance_px: 4.0,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/asteroids.bin"),
            metadata_path: PathBuf::from("data/asteroids_meta.json"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            fps_log_interval_s: 5.0,
            verify_gpu_parity: false,
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                    path: config_path.clone(),
                    source,
                })?;
            let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("quality: High"));
        assert!(ron_str.contains("low_quality_instance_cap: 6000"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_defaults_match_engine_constants() {
        let config = Config::default();
        assert_eq!(config.simulation.days_per_second, 50.0);
        assert_eq!(config.picking.threshold_scene_units, 4.0);
        assert_eq!(config.simulation.speed_presets, vec![1.0, 10.0, 50.0, 100.0]);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (width: 800), render: (quality: Low))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.render.quality, Quality::Low);
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.picking, PickingConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_quality_toggle_and_samples() {
        assert_eq!(Quality::High.toggled(), Quality::Low);
        assert_eq!(Quality::Low.toggled(), Quality::High);
        assert_eq!(Quality::High.msaa_samples(), 4);
        assert_eq!(Quality::Low.msaa_samples(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.render.quality = Quality::Low;
        config.data.catalog_path = PathBuf::from("/tmp/other.bin");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), Some(dir.path().join("config.ron").as_path()));
        assert!(err.to_string().contains("config.ron"), "{err}");
    }

    #[test]
    fn test_unreadable_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be: exists() passes, the read fails.
        std::fs::create_dir(dir.path().join("config.ron")).unwrap();
        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
        assert_eq!(err.path(), Some(dir.path().join("config.ron").as_path()));
    }

    #[test]
    fn test_save_into_file_path_names_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, "").unwrap();
        let err = Config::default().save(&blocker).unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }), "{err:?}");
        assert_eq!(err.path(), Some(blocker.as_path()));
    }
}
