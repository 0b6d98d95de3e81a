//! Physical and scene constants shared by every evaluator.
//!
//! The GPU shader embeds the same literals; changing any value here without
//! changing `orrery-render`'s orbit WGSL breaks picking parity.

/// Gaussian gravitational constant squared, in AU³/day².
pub const GAUSSIAN_MU: f64 = 0.000_295_912_2;

/// Simulation days advanced per wall-clock second at speed multiplier 1.0.
pub const DAYS_PER_SECOND: f64 = 50.0;

/// Scene units per astronomical unit.
pub const AU_TO_SCENE: f64 = 10.0;

/// Days per Julian year, used for the displayed period approximation.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Simulation days covered by one shader time epoch. The GPU receives time
/// as `f32` relative to the epoch start, and instance mean anomalies are
/// re-based whenever the epoch changes.
pub const SHADER_EPOCH_DAYS: f64 = 3_652.5;
