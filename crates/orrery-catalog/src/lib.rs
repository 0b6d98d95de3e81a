//! Body catalog: the immutable orbital element store loaded once at startup.
//!
//! The binary file is a flat little-endian `f32` stream, nine floats per body;
//! a JSON sidecar carries class codes and per-body ids and names. The GPU
//! instance buffer is the record array uploaded as-is.

mod catalog;
mod error;
mod metadata;
pub mod palette;
mod record;
pub mod synthetic;
mod writer;

pub use catalog::BodyCatalog;
pub use error::CatalogError;
pub use metadata::CatalogMetadata;
pub use palette::{MAX_CLASSES, Palette};
pub use record::{BodyRecord, FLOATS_PER_RECORD, RECORD_STRIDE};
pub use writer::CatalogWriter;
