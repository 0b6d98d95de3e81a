//! Class colour palette.
//!
//! A fixed table of 32 slots, indexed by a record's class id, plus a separate
//! default colour for ids outside the table. The shader receives the same 33
//! colours as a uniform array, so the host lookup and the GPU lookup agree.

/// Number of palette slots addressable by class id.
pub const MAX_CLASSES: usize = 32;

/// Colour of unclassified bodies and of out-of-range class ids.
pub const DEFAULT_HEX: u32 = 0x706353;

/// Known class codes and their sRGB colours.
const CLASS_COLORS: &[(&str, u32)] = &[
    ("MBA", 0x00ada7),
    ("TJN", 0xf38b8a),
    ("OMB", 0xffd393),
    ("GRK", 0xcb2855),
    ("CEN", 0xc4bd6c),
    ("MCA", 0xd73423),
    ("AST", 0x706353),
    ("TNO", 0x1f8a70),
    ("AMO", 0x979330),
    ("IMB", 0xe19222),
    ("APO", 0x979330),
    ("ATE", 0x979330),
    ("IEO", 0x979330),
    ("HYA", 0xaec7b2),
    // comets
    ("PAR", 0xe6dfcf),
    ("JFc", 0xe6dfcf),
    ("COM", 0xe6dfcf),
    ("HYP", 0xe6dfcf),
    ("HTC", 0xe6dfcf),
    ("ETc", 0xe6dfcf),
    ("Etc", 0xe6dfcf),
    ("JFC", 0xe6dfcf),
    ("CTc", 0xe6dfcf),
    // planets
    ("Mercury", 0xb6a965),
    ("Venus", 0xd05227),
    ("Earth", 0x7ebce5),
    ("Mars", 0xcb2655),
    ("Jupiter", 0xe1d9c4),
    ("Saturn", 0xa73e5c),
    ("Uranus", 0xf34e52),
    ("Neptune", 0x738cc1),
];

/// sRGB colour of a class code, if it is a known one.
pub fn class_hex(code: &str) -> Option<u32> {
    CLASS_COLORS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|&(_, hex)| hex)
}

/// Convert `0xRRGGBB` to linear RGBA for an sRGB render target.
pub fn hex_to_linear(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), 1.0]
}

/// Resolved palette for one catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    /// Linear colour per class slot.
    pub colors: [[f32; 4]; MAX_CLASSES],
    /// Linear colour for ids outside `colors`.
    pub default_color: [f32; 4],
}

impl Default for Palette {
    fn default() -> Self {
        let default_color = hex_to_linear(DEFAULT_HEX);
        Self {
            colors: [default_color; MAX_CLASSES],
            default_color,
        }
    }
}

impl Palette {
    /// Fill slots from a catalog's class list. Unknown codes and slots past
    /// the list keep the default colour; classes past slot 31 are dropped.
    pub fn from_classes<S: AsRef<str>>(classes: &[S]) -> Self {
        let mut palette = Self::default();
        for (slot, code) in palette.colors.iter_mut().zip(classes) {
            if let Some(hex) = class_hex(code.as_ref()) {
                *slot = hex_to_linear(hex);
            }
        }
        palette
    }

    /// Colour for a raw `class_id` float, with the same rounding and range
    /// rules the shader applies.
    pub fn color_for(&self, class_id: f32) -> [f32; 4] {
        let rounded = class_id.round();
        if rounded.is_finite() && rounded >= 0.0 && (rounded as usize) < MAX_CLASSES {
            self.colors[rounded as usize]
        } else {
            self.default_color
        }
    }
}
