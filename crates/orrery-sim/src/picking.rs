//! Host-side asteroid picking.
//!
//! Re-evaluates every body's orbit at the current simulation time and keeps
//! the one closest to the click ray. The loop does no allocation.

use glam::DVec3;
use orrery_catalog::BodyRecord;
use orrery_orbit::AU_TO_SCENE;

use crate::ray::Ray;

/// Nearest body found by [`pick_nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Catalog index.
    pub index: usize,
    /// Squared point-to-ray distance, scene units².
    pub distance_sq: f64,
    /// Position at the pick time, scene units.
    pub world_position: DVec3,
}

/// Sweep `records` for the body nearest `ray` at time `t` (days).
///
/// A body qualifies when its squared distance to the ray is below
/// `threshold²`. Comparison is strict, so on ties the lowest index wins.
/// Degenerate records produce NaN distances and never qualify.
pub fn pick_nearest(records: &[BodyRecord], ray: &Ray, t: f64, threshold: f64) -> Option<PickHit> {
    let threshold_sq = threshold * threshold;
    let mut best: Option<PickHit> = None;
    let mut best_sq = f64::INFINITY;

    for (index, record) in records.iter().enumerate() {
        let world_position = record.elements().position_at(t) * AU_TO_SCENE;
        let distance_sq = ray.distance_sq_to_point(world_position);
        if distance_sq < threshold_sq && distance_sq < best_sq {
            best_sq = distance_sq;
            best = Some(PickHit {
                index,
                distance_sq,
                world_position,
            });
        }
    }
    best
}
