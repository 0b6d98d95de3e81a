//! Per-body record layout shared by the binary file, the host, and the GPU.

use bytemuck::{Pod, Zeroable};
use orrery_orbit::OrbitalElements;

/// Floats per record in the binary catalog.
pub const FLOATS_PER_RECORD: usize = 9;

/// Byte stride of one record, in the file and in the instance buffer.
pub const RECORD_STRIDE: usize = FLOATS_PER_RECORD * std::mem::size_of::<f32>();

/// One body, exactly as stored on disk and uploaded as instance data.
///
/// Field order is the file order: `e, q, i, om, w, ma, epoch, diameter,
/// class_id`. Angles are radians, `q` is AU, `epoch` is MJD, `diameter` km.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BodyRecord {
    pub eccentricity: f32,
    pub periapsis_distance: f32,
    pub inclination: f32,
    pub ascending_node: f32,
    pub argument_of_periapsis: f32,
    pub mean_anomaly: f32,
    pub epoch_mjd: f32,
    pub diameter_km: f32,
    /// Class index stored as a float. Rounded on lookup.
    pub class_id: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<BodyRecord>(), RECORD_STRIDE);
static_assertions::const_assert_eq!(std::mem::align_of::<BodyRecord>(), 4);

impl BodyRecord {
    /// Decode one record from `RECORD_STRIDE` little-endian bytes.
    pub(crate) fn from_le_bytes(chunk: &[u8]) -> Self {
        let mut floats = [0.0f32; FLOATS_PER_RECORD];
        for (dst, src) in floats.iter_mut().zip(chunk.chunks_exact(4)) {
            *dst = f32::from_le_bytes([src[0], src[1], src[2], src[3]]);
        }
        bytemuck::cast(floats)
    }

    /// Append this record to `out` as little-endian bytes.
    pub(crate) fn write_le_bytes(&self, out: &mut Vec<u8>) {
        let floats: [f32; FLOATS_PER_RECORD] = bytemuck::cast(*self);
        for f in floats {
            out.extend_from_slice(&f.to_le_bytes());
        }
    }

    /// Widen to `f64` elements for host evaluation.
    pub fn elements(&self) -> OrbitalElements {
        OrbitalElements {
            eccentricity: self.eccentricity as f64,
            periapsis_distance: self.periapsis_distance as f64,
            inclination: self.inclination as f64,
            ascending_node: self.ascending_node as f64,
            argument_of_periapsis: self.argument_of_periapsis as f64,
            mean_anomaly: self.mean_anomaly as f64,
            epoch_mjd: self.epoch_mjd as f64,
        }
    }

    /// Copy with the mean anomaly advanced to `epoch` days, for upload with
    /// an epoch-relative shader time. The anomaly is reduced in `f64` before
    /// narrowing.
    pub fn rebased(&self, epoch: f64) -> Self {
        Self {
            mean_anomaly: self.elements().mean_anomaly_at(epoch) as f32,
            ..*self
        }
    }

    /// Rounded class index, or `None` for negative or non-finite ids.
    pub fn class_index(&self) -> Option<usize> {
        let rounded = self.class_id.round();
        if rounded.is_finite() && rounded >= 0.0 {
            Some(rounded as usize)
        } else {
            None
        }
    }

    /// Whether the orbit is a bound ellipse the evaluator is defined for.
    pub fn is_elliptical(&self) -> bool {
        self.eccentricity.is_finite()
            && (0.0..1.0).contains(&self.eccentricity)
            && self.periapsis_distance.is_finite()
            && self.periapsis_distance > 0.0
    }
}
