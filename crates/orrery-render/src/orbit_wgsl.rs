//! Orbit evaluation in WGSL, shared by the asteroid vertex shader and the
//! parity compute kernel.
//!
//! The operation order matches [`OrbitalElements::shader_position`] so the
//! host can replay a GPU position in `f32`.
//!
//! [`OrbitalElements::shader_position`]: orrery_orbit::OrbitalElements::shader_position

use orrery_orbit::{GAUSSIAN_MU, SHADER_ITERATIONS};

/// WGSL preamble defining `solve_kepler` and `orbit_position`.
///
/// The `{MU}` and `{ITERATIONS}` placeholders are filled by [`orbit_source`].
const ORBIT_TEMPLATE: &str = r#"
const GAUSSIAN_MU: f32 = {MU};
const TAU: f32 = 6.283185307179586;
const KEPLER_ITERATIONS: u32 = {ITERATIONS}u;

// Newton iteration on E - e sin E = M, seeded with E = M.
fn solve_kepler(m: f32, e: f32) -> f32 {
    var ea = m;
    for (var i = 0u; i < KEPLER_ITERATIONS; i = i + 1u) {
        ea = ea - (ea - e * sin(ea) - m) / (1.0 - e * cos(ea));
    }
    return ea;
}

// Heliocentric position in AU at time t (days).
fn orbit_position(e: f32, q: f32, inc: f32, om: f32, w: f32, ma: f32, t: f32) -> vec3<f32> {
    let a = q / (1.0 - e);
    let n = sqrt(GAUSSIAN_MU / (a * a * a));
    let m_raw = ma + n * t;
    let m = m_raw - TAU * floor(m_raw / TAU);
    let ea = solve_kepler(m, e);

    let px = a * (cos(ea) - e);
    let py = a * sqrt(1.0 - e * e) * sin(ea);

    // Rz(w)
    let sw = sin(w);
    let cw = cos(w);
    let x1 = px * cw - py * sw;
    let y1 = px * sw + py * cw;
    // Rx(inc)
    let si = sin(inc);
    let ci = cos(inc);
    let y2 = y1 * ci;
    let z2 = y1 * si;
    // Rz(om)
    let so = sin(om);
    let co = cos(om);
    return vec3<f32>(x1 * co - y2 * so, x1 * so + y2 * co, z2);
}
"#;

/// The orbit preamble with constants substituted.
pub fn orbit_source() -> String {
    ORBIT_TEMPLATE
        .replace("{MU}", &(GAUSSIAN_MU as f32).to_string())
        .replace("{ITERATIONS}", &SHADER_ITERATIONS.to_string())
}

/// Concatenate the orbit preamble with a shader body that calls it.
pub fn compose(body: &str) -> String {
    let mut source = orbit_source();
    source.push('\n');
    source.push_str(body);
    source
}
