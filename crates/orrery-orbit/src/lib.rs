//! Keplerian orbit propagation: the Kepler solver, the orbit evaluator, and the
//! shared physical/scene constants used by both the renderer and the picker.

pub mod constants;
mod elements;
pub mod kepler;

pub use constants::{AU_TO_SCENE, DAYS_PER_SECOND, DAYS_PER_YEAR, GAUSSIAN_MU, SHADER_EPOCH_DAYS};
pub use elements::{OrbitalElements, rotate_x, rotate_z, split_shader_time};
pub use kepler::{KeplerSolution, SHADER_ITERATIONS, solve, solve_detailed, solve_fixed_f32};
