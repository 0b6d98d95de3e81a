//! Orbital elements and the orbit evaluator.
//!
//! [`OrbitalElements::position_at`] is the host evaluator used for picking and
//! for selection snapshots. [`OrbitalElements::shader_position`] replays the
//! instance shader's arithmetic in `f32` so parity can be tested without a GPU.

use glam::{DVec3, Vec3};
use std::f64::consts::TAU;

use crate::constants::{AU_TO_SCENE, DAYS_PER_YEAR, GAUSSIAN_MU, SHADER_EPOCH_DAYS};
use crate::kepler::{self, SHADER_ITERATIONS};

/// Keplerian elements of one elliptical orbit.
///
/// Angles are radians, distances AU. `eccentricity` must be in `[0, 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalElements {
    /// Eccentricity `e`.
    pub eccentricity: f64,
    /// Periapsis distance `q` in AU.
    pub periapsis_distance: f64,
    /// Inclination `i`.
    pub inclination: f64,
    /// Longitude of the ascending node `om`.
    pub ascending_node: f64,
    /// Argument of periapsis `w`.
    pub argument_of_periapsis: f64,
    /// Mean anomaly at `t = 0`.
    pub mean_anomaly: f64,
    /// Catalog epoch (Modified Julian Date). Carried, not used in propagation.
    pub epoch_mjd: f64,
}

impl OrbitalElements {
    /// Semi-major axis `a = q / (1 - e)` in AU.
    pub fn semi_major_axis(&self) -> f64 {
        self.periapsis_distance / (1.0 - self.eccentricity)
    }

    /// Mean motion `n = sqrt(μ / a³)` in rad/day.
    pub fn mean_motion(&self) -> f64 {
        let a = self.semi_major_axis();
        (GAUSSIAN_MU / (a * a * a)).sqrt()
    }

    /// Exact Keplerian period `2π / n` in days.
    pub fn period_days(&self) -> f64 {
        TAU / self.mean_motion()
    }

    /// Period shown to users: `sqrt(a³) × 365.25` days.
    ///
    /// Differs from [`period_days`](Self::period_days) by under 0.01%.
    pub fn display_period_days(&self) -> f64 {
        let a = self.semi_major_axis();
        (a * a * a).sqrt() * DAYS_PER_YEAR
    }

    /// Mean anomaly at simulation time `t` (days), reduced to `[0, 2π)`.
    pub fn mean_anomaly_at(&self, t: f64) -> f64 {
        (self.mean_anomaly + self.mean_motion() * t).rem_euclid(TAU)
    }

    /// Heliocentric position in AU at simulation time `t` (days).
    pub fn position_at(&self, t: f64) -> DVec3 {
        let e = self.eccentricity;
        let a = self.semi_major_axis();
        let e_anom = kepler::solve(self.mean_anomaly_at(t), e);

        let perifocal = DVec3::new(
            a * (e_anom.cos() - e),
            a * (1.0 - e * e).sqrt() * e_anom.sin(),
            0.0,
        );

        let p = rotate_z(perifocal, self.argument_of_periapsis);
        let p = rotate_x(p, self.inclination);
        rotate_z(p, self.ascending_node)
    }

    /// Position in scene units at simulation time `t`.
    pub fn scene_position_at(&self, t: f64) -> DVec3 {
        self.position_at(t) * AU_TO_SCENE
    }

    /// The same orbit with its mean anomaly moved to `epoch`, so that
    /// `rebased(epoch).position_at(t - epoch) == position_at(t)`.
    pub fn rebased(&self, epoch: f64) -> Self {
        Self {
            mean_anomaly: self.mean_anomaly_at(epoch),
            ..*self
        }
    }

    /// `f32` replay of the instance shader, in AU.
    ///
    /// Same operation order as the WGSL `orbit_position` function, including
    /// the fixed five-step solver and the mean anomaly wrap.
    pub fn shader_position(&self, t: f32) -> Vec3 {
        let e = self.eccentricity as f32;
        let q = self.periapsis_distance as f32;
        let a = q / (1.0 - e);
        let n = (GAUSSIAN_MU as f32 / (a * a * a)).sqrt();
        let m_raw = self.mean_anomaly as f32 + n * t;
        let tau = std::f32::consts::TAU;
        let m = m_raw - tau * (m_raw / tau).floor();
        let e_anom = kepler::solve_fixed_f32(m, e, SHADER_ITERATIONS);

        let x = a * (e_anom.cos() - e);
        let y = a * (1.0 - e * e).sqrt() * e_anom.sin();

        let (s, c) = (self.argument_of_periapsis as f32).sin_cos();
        let (x, y) = (x * c - y * s, x * s + y * c);
        let (s, c) = (self.inclination as f32).sin_cos();
        let (y, z) = (y * c, y * s);
        let (s, c) = (self.ascending_node as f32).sin_cos();
        Vec3::new(x * c - y * s, x * s + y * c, z)
    }
}

/// Split simulation time into the shader epoch start and the `f32` offset
/// the shader receives. The offset stays below [`SHADER_EPOCH_DAYS`], which
/// keeps `n * t` well inside `f32` precision at any session length.
pub fn split_shader_time(t: f64) -> (f64, f32) {
    let epoch = (t / SHADER_EPOCH_DAYS).floor() * SHADER_EPOCH_DAYS;
    (epoch, (t - epoch) as f32)
}

/// Rotate `v` about the Z axis by `angle` radians (right-handed).
pub fn rotate_z(v: DVec3, angle: f64) -> DVec3 {
    let (s, c) = angle.sin_cos();
    DVec3::new(v.x * c - v.y * s, v.x * s + v.y * c, v.z)
}

/// Rotate `v` about the X axis by `angle` radians (right-handed).
pub fn rotate_x(v: DVec3, angle: f64) -> DVec3 {
    let (s, c) = angle.sin_cos();
    DVec3::new(v.x, v.y * c - v.z * s, v.y * s + v.z * c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn elements(e: f64, q: f64, i: f64, om: f64, w: f64, ma: f64) -> OrbitalElements {
        OrbitalElements {
            eccentricity: e,
            periapsis_distance: q,
            inclination: i,
            ascending_node: om,
            argument_of_periapsis: w,
            mean_anomaly: ma,
            epoch_mjd: 59_000.0,
        }
    }

    #[test]
    fn test_reference_body_at_epoch() {
        // a = 0.9 / 0.9 = 1.0, M = 0 → E = 0, P = a(1 - e) = 0.9, Q = 0.
        let body = elements(0.1, 0.9, 0.0, 0.0, 0.0, 0.0);
        assert!((body.semi_major_axis() - 1.0).abs() < 1e-12);
        let pos = body.position_at(0.0);
        assert!((pos.x - 0.9).abs() < 1e-12, "x={}", pos.x);
        assert!(pos.y.abs() < 1e-12);
        assert!(pos.z.abs() < 1e-12);
    }

    #[test]
    fn test_circular_orbit_constant_radius() {
        let body = elements(0.0, 2.5, 0.4, 1.1, 0.3, 0.7);
        let period = body.period_days();
        for k in 0..50 {
            let t = k as f64 / 50.0 * period * 3.0;
            let r = body.position_at(t).length();
            assert!((r - 2.5).abs() < 1e-9, "t={t}, r={r}");
        }
    }

    #[test]
    fn test_position_is_periodic() {
        let body = elements(0.35, 1.8, 0.2, 2.0, 4.1, 1.0);
        let period = body.period_days();
        for t in [0.0, 17.0, 250.0, 1234.5] {
            let a = body.position_at(t);
            let b = body.position_at(t + period);
            assert!((a - b).length() < 1e-6, "t={t}: {a} vs {b}");
        }
    }

    #[test]
    fn test_aphelion_at_half_period() {
        let body = elements(0.2, 0.8, 0.0, 0.0, 0.0, 0.0);
        let pos = body.position_at(body.period_days() / 2.0);
        // a = 1.0, aphelion = a(1 + e) on the -X axis.
        assert!((pos.x + 1.2).abs() < 1e-6, "x={}", pos.x);
        assert!(pos.y.abs() < 1e-6);
    }

    #[test]
    fn test_rotation_order_argument_then_inclination_then_node() {
        // Periapsis on +X; w = 90° moves it to +Y; i = 90° tips +Y onto +Z;
        // om = 90° leaves the Z component alone.
        let body = elements(0.0, 1.0, FRAC_PI_2, FRAC_PI_2, FRAC_PI_2, 0.0);
        let pos = body.position_at(0.0);
        assert!(pos.x.abs() < 1e-12);
        assert!(pos.y.abs() < 1e-12);
        assert!((pos.z - 1.0).abs() < 1e-12, "pos={pos}");
    }

    #[test]
    fn test_node_rotation_is_about_z() {
        let body = elements(0.0, 1.0, 0.0, PI, 0.0, 0.0);
        let pos = body.position_at(0.0);
        assert!((pos.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_period_close_to_keplerian() {
        let body = elements(0.1, 2.43, 0.1, 0.0, 0.0, 0.0);
        let ratio = body.display_period_days() / body.period_days();
        assert!((ratio - 1.0).abs() < 1e-3, "ratio={ratio}");
    }

    #[test]
    fn test_earth_like_period_is_one_year() {
        let body = elements(0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
        assert!((body.period_days() - 365.25).abs() < 0.1);
    }

    #[test]
    fn test_scene_position_scales_by_ten() {
        let body = elements(0.1, 0.9, 0.0, 0.0, 0.0, 0.0);
        assert!((body.scene_position_at(0.0).x - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_shader_replay_matches_host() {
        let bodies = [
            elements(0.1, 0.9, 0.1, 0.5, 1.0, 0.2),
            elements(0.25, 2.1, 0.3, 4.0, 2.2, 5.9),
            elements(0.6, 0.7, 1.2, 3.3, 0.4, 3.0),
            elements(0.05, 5.1, 0.02, 1.7, 5.5, 0.0),
        ];
        for body in &bodies {
            for t in [0.0_f32, 50.0, 3_000.0, 40_000.0] {
                let gpu = body.shader_position(t).as_dvec3();
                let host = body.position_at(t as f64);
                assert!(
                    (gpu - host).length() < 1e-3,
                    "t={t}: shader {gpu} vs host {host}"
                );
            }
        }
    }

    #[test]
    fn test_rebased_orbit_matches_original() {
        let body = elements(0.3, 1.6, 0.4, 2.0, 1.1, 0.5);
        let epoch = 7_305.0;
        for dt in [0.0, 12.5, 900.0] {
            let a = body.rebased(epoch).position_at(dt);
            let b = body.position_at(epoch + dt);
            assert!((a - b).length() < 1e-9, "dt={dt}: {a} vs {b}");
        }
    }

    #[test]
    fn test_split_shader_time() {
        assert_eq!(split_shader_time(0.0), (0.0, 0.0));
        let (epoch, offset) = split_shader_time(10_000.0);
        assert_eq!(epoch, 2.0 * SHADER_EPOCH_DAYS);
        assert!((offset as f64 - (10_000.0 - 2.0 * SHADER_EPOCH_DAYS)).abs() < 1e-3);
        let (_, offset) = split_shader_time(1.44e8 + 0.25);
        assert!((0.0..SHADER_EPOCH_DAYS as f32).contains(&offset));
    }

    #[test]
    fn test_shader_replay_holds_over_long_sessions() {
        // 1x for an hour, 100x for an hour, 100x for eight hours.
        let bodies = [
            elements(0.1, 0.9, 0.1, 0.5, 1.0, 0.2),
            elements(0.25, 2.1, 0.3, 4.0, 2.2, 5.9),
            elements(0.35, 1.2, 1.2, 3.3, 0.4, 3.0),
        ];
        for body in &bodies {
            for t in [1.8e5, 1.8e7, 1.44e8] {
                let (epoch, offset) = split_shader_time(t);
                let gpu = body.rebased(epoch).shader_position(offset).as_dvec3();
                let host = body.position_at(t);
                // 1e-3 AU, i.e. 0.01 scene units against a 4.0 pick radius.
                assert!(
                    (gpu - host).length() < 1e-3,
                    "t={t}: shader {gpu} vs host {host}"
                );
            }
        }
    }
}
