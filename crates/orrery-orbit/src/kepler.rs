//! Newton-Raphson solver for Kepler's equation `E - e·sin(E) = M`.
//!
//! Two variants exist. The host variant iterates until `|ΔE|` drops below
//! [`HOST_TOLERANCE`] or [`HOST_MAX_ITERATIONS`] is reached. The shader variant
//! runs exactly [`SHADER_ITERATIONS`] steps in `f32`, matching the WGSL loop in
//! the instance pipeline step for step.

/// Iteration cap for the host solver. Near-unity eccentricities stop here
/// instead of looping unbounded.
pub const HOST_MAX_ITERATIONS: u32 = 10;

/// Early-exit threshold on the Newton step for the host solver.
pub const HOST_TOLERANCE: f64 = 1e-6;

/// Fixed iteration count of the GPU solver.
pub const SHADER_ITERATIONS: u32 = 5;

/// Outcome of a host Kepler solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly in radians.
    pub eccentric_anomaly: f64,
    /// Newton steps taken.
    pub iterations: u32,
    /// Whether the last step was below [`HOST_TOLERANCE`].
    pub converged: bool,
}

/// Solve Kepler's equation on the host, seeded with `E₀ = M`.
///
/// Undefined for `eccentricity >= 1`.
pub fn solve(mean_anomaly: f64, eccentricity: f64) -> f64 {
    solve_detailed(mean_anomaly, eccentricity).eccentric_anomaly
}

/// Like [`solve`], also reporting iteration count and convergence.
///
/// A non-converged result is still the best estimate after the iteration cap;
/// callers never see an error for it.
pub fn solve_detailed(mean_anomaly: f64, eccentricity: f64) -> KeplerSolution {
    let mut e_anom = mean_anomaly;
    for iteration in 1..=HOST_MAX_ITERATIONS {
        let delta = (e_anom - eccentricity * e_anom.sin() - mean_anomaly)
            / (1.0 - eccentricity * e_anom.cos());
        e_anom -= delta;
        if delta.abs() < HOST_TOLERANCE {
            return KeplerSolution {
                eccentric_anomaly: e_anom,
                iterations: iteration,
                converged: true,
            };
        }
    }
    KeplerSolution {
        eccentric_anomaly: e_anom,
        iterations: HOST_MAX_ITERATIONS,
        converged: false,
    }
}

/// `f32` fixed-iteration solve, the exact mirror of the shader loop.
pub fn solve_fixed_f32(mean_anomaly: f32, eccentricity: f32, iterations: u32) -> f32 {
    let mut e_anom = mean_anomaly;
    for _ in 0..iterations {
        e_anom -= (e_anom - eccentricity * e_anom.sin() - mean_anomaly)
            / (1.0 - eccentricity * e_anom.cos());
    }
    e_anom
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn residual(e_anom: f64, eccentricity: f64, mean_anomaly: f64) -> f64 {
        (e_anom - eccentricity * e_anom.sin() - mean_anomaly).abs()
    }

    #[test]
    fn test_satisfies_kepler_equation_over_grid() {
        for ei in 0..=18 {
            let e = ei as f64 * 0.05;
            for mi in 0..64 {
                let m = mi as f64 / 64.0 * TAU;
                let big_e = solve(m, e);
                assert!(
                    residual(big_e, e, m) < 1e-5,
                    "e={e}, M={m}, E={big_e}, residual={}",
                    residual(big_e, e, m)
                );
            }
        }
    }

    #[test]
    fn test_circular_orbit_returns_mean_anomaly() {
        for mi in 0..16 {
            let m = mi as f64 * 0.4;
            assert!((solve(m, 0.0) - m).abs() < 1e-12);
        }
    }

    #[test]
    fn test_circular_orbit_converges_on_first_step() {
        // First step is exactly zero for e = 0, which passes the tolerance check.
        let solution = solve_detailed(1.3, 0.0);
        assert!(solution.converged);
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn test_near_unity_eccentricity_is_bounded() {
        let solution = solve_detailed(0.001, 0.9999);
        assert!(solution.iterations <= HOST_MAX_ITERATIONS);
        assert!(solution.eccentric_anomaly.is_finite());
    }

    #[test]
    fn test_shader_mirror_matches_host_for_catalog_eccentricities() {
        for ei in 0..=6 {
            let e = ei as f32 * 0.1;
            for mi in 0..32 {
                let m = mi as f32 / 32.0 * std::f32::consts::TAU;
                let gpu = solve_fixed_f32(m, e, SHADER_ITERATIONS) as f64;
                let host = solve(m as f64, e as f64);
                assert!((gpu - host).abs() < 1e-4, "e={e}, M={m}: {gpu} vs {host}");
            }
        }
    }

    #[test]
    fn test_zero_iterations_returns_seed() {
        assert_eq!(solve_fixed_f32(0.7, 0.3, 0), 0.7);
    }
}
