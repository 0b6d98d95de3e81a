//! Deterministic synthetic catalogs for running without data files.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;

use crate::catalog::BodyCatalog;
use crate::metadata::CatalogMetadata;
use crate::record::BodyRecord;

/// Population classes the generator draws from, with their relative weights
/// and semi-major axis / eccentricity ranges.
const POPULATIONS: &[Population] = &[
    Population::new("MBA", 70, (2.1, 3.3), 0.25, 0.30),
    Population::new("IMB", 6, (1.8, 2.1), 0.20, 0.35),
    Population::new("OMB", 8, (3.3, 4.2), 0.20, 0.30),
    Population::new("APO", 4, (1.1, 2.5), 0.60, 0.40),
    Population::new("AMO", 4, (1.2, 2.6), 0.45, 0.40),
    Population::new("TJN", 6, (5.05, 5.35), 0.15, 0.50),
    Population::new("JFc", 2, (3.0, 6.0), 0.70, 0.30),
];

struct Population {
    code: &'static str,
    weight: u32,
    semi_major: (f32, f32),
    max_e: f32,
    max_i: f32,
}

impl Population {
    const fn new(
        code: &'static str,
        weight: u32,
        semi_major: (f32, f32),
        max_e: f32,
        max_i: f32,
    ) -> Self {
        Self {
            code,
            weight,
            semi_major,
            max_e,
            max_i,
        }
    }
}

/// Generates a main-belt-like catalog. Same seed and count, same catalog.
pub struct SyntheticCatalog {
    seed: u64,
    count: usize,
}

impl SyntheticCatalog {
    /// Seed used by `--synthetic`.
    pub const DEFAULT_SEED: u64 = 0x0bb1_7a15;

    pub fn new(seed: u64, count: usize) -> Self {
        Self { seed, count }
    }

    pub fn generate(&self) -> BodyCatalog {
        let (records, metadata) = self.generate_parts();
        BodyCatalog::from_parts(records, metadata)
    }

    /// Records plus metadata, for callers that want to write them out.
    pub fn generate_parts(&self) -> (Vec<BodyRecord>, CatalogMetadata) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let total_weight: u32 = POPULATIONS.iter().map(|p| p.weight).sum();

        let mut records = Vec::with_capacity(self.count);
        let mut ids = Vec::with_capacity(self.count);
        let mut names = Vec::with_capacity(self.count);

        for n in 0..self.count {
            let mut pick = rng.random_range(0..total_weight);
            let mut class_id = 0;
            for (idx, population) in POPULATIONS.iter().enumerate() {
                if pick < population.weight {
                    class_id = idx;
                    break;
                }
                pick -= population.weight;
            }
            let population = &POPULATIONS[class_id];

            let a = rng.random_range(population.semi_major.0..population.semi_major.1);
            let e = rng.random::<f32>() * population.max_e;
            // Diameter spans ~0.5..300 km, skewed small.
            let diameter = (rng.random::<f32>().powi(3) * 6.4 - 0.7).exp();

            records.push(BodyRecord {
                eccentricity: e,
                periapsis_distance: a * (1.0 - e),
                inclination: rng.random::<f32>() * population.max_i,
                ascending_node: rng.random::<f32>() * TAU,
                argument_of_periapsis: rng.random::<f32>() * TAU,
                mean_anomaly: rng.random::<f32>() * TAU,
                epoch_mjd: 59000.0,
                diameter_km: diameter,
                class_id: class_id as f32,
            });
            ids.push(format!("{}", 20_000_001 + n));
            names.push(format!("{} {}", population.code, n + 1));
        }

        let metadata = CatalogMetadata {
            classes: POPULATIONS.iter().map(|p| p.code.to_string()).collect(),
            ids,
            names,
        };
        (records, metadata)
    }
}
