//! The eight planets on simplified circular orbits.

use glam::DVec3;
use orrery_orbit::AU_TO_SCENE;
use std::f64::consts::TAU;

use crate::ray::Ray;

/// A planet on a circular orbit in the scene's XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planet {
    pub name: &'static str,
    /// Orbit radius in AU.
    pub distance_au: f64,
    pub period_days: f64,
    pub diameter_km: f64,
    /// JPL HORIZONS body id.
    pub horizons_id: u32,
    /// Display colour, `0xRRGGBB` sRGB.
    pub color_hex: u32,
}

pub const PLANETS: [Planet; 8] = [
    Planet::new("Mercury", 0.39, 88.0, 4879.0, 199, 0xb6a965),
    Planet::new("Venus", 0.72, 225.0, 12104.0, 299, 0xd05227),
    Planet::new("Earth", 1.0, 365.0, 12742.0, 399, 0x7ebce5),
    Planet::new("Mars", 1.52, 687.0, 6779.0, 499, 0xcb2655),
    Planet::new("Jupiter", 5.2, 4331.0, 139822.0, 599, 0xe1d9c4),
    Planet::new("Saturn", 9.5, 10747.0, 116464.0, 699, 0xa73e5c),
    Planet::new("Uranus", 19.2, 30589.0, 50724.0, 799, 0xf34e52),
    Planet::new("Neptune", 30.1, 59800.0, 49244.0, 899, 0x738cc1),
];

impl Planet {
    const fn new(
        name: &'static str,
        distance_au: f64,
        period_days: f64,
        diameter_km: f64,
        horizons_id: u32,
        color_hex: u32,
    ) -> Self {
        Self {
            name,
            distance_au,
            period_days,
            diameter_km,
            horizons_id,
            color_hex,
        }
    }

    /// Orbital angle at time `t` (days).
    pub fn angle_at(&self, t: f64) -> f64 {
        t / self.period_days * TAU
    }

    /// Scene-space centre at time `t`.
    pub fn position_at(&self, t: f64) -> DVec3 {
        let angle = self.angle_at(t);
        DVec3::new(angle.cos(), 0.0, angle.sin()) * self.distance_au * AU_TO_SCENE
    }

    /// Sphere radius in scene units, also the click radius.
    pub fn display_radius(&self) -> f64 {
        (self.diameter_km / 1000.0 + 1.0).ln() * 0.3
    }

    /// Ray parameter of the hit on this planet's sphere at time `t`.
    pub fn ray_hit(&self, ray: &Ray, t: f64) -> Option<f64> {
        ray.intersect_sphere(self.position_at(t), self.display_radius())
    }
}

/// Nearest planet hit by `ray` at time `t`: `(index into PLANETS, ray t)`.
pub fn nearest_planet_hit(ray: &Ray, t: f64) -> Option<(usize, f64)> {
    PLANETS
        .iter()
        .enumerate()
        .filter_map(|(index, planet)| planet.ray_hit(ray, t).map(|hit| (index, hit)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
