//! Orrery viewer binary.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-app -- --synthetic 18000` to view a generated
//! catalog without data files.

use std::process::ExitCode;

use clap::Parser;
use orrery_app::{PlatformDirs, run};
use orrery_catalog::synthetic::SyntheticCatalog;
use orrery_catalog::{BodyCatalog, CatalogError};
use orrery_config::{CliArgs, Config};
use orrery_sim::Engine;
use tracing::{error, info};

/// The catalog for this session, from data files or the synthetic generator.
fn load_catalog(args: &CliArgs, config: &Config) -> Result<BodyCatalog, CatalogError> {
    if let Some(count) = args.synthetic {
        info!(count, "Generating synthetic catalog");
        return Ok(SyntheticCatalog::new(SyntheticCatalog::DEFAULT_SEED, count).generate());
    }
    info!(
        catalog = %config.data.catalog_path.display(),
        metadata = %config.data.metadata_path.display(),
        "Loading catalog"
    );
    BodyCatalog::load(&config.data.catalog_path, &config.data.metadata_path)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::for_override(args.config.as_deref()) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to prepare config directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    orrery_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(config_dir = %dirs.config_dir.display(), "Starting orrery");

    let mut engine = Engine::new(load_catalog(&args, &config), &config);
    engine.set_on_select(|selected| match selected {
        Some(obj) => info!(
            id = %obj.id,
            name = %obj.name,
            class = %obj.class,
            diameter_km = obj.diameter_km,
            period_days = obj.period_days,
            distance_au = obj.distance_au,
            "Selection"
        ),
        None => info!("Selection cleared"),
    });

    match run(config, engine) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Event loop failed: {e}");
            ExitCode::FAILURE
        }
    }
}
