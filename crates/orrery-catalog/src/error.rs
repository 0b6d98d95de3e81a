//! Catalog load errors.

use std::path::PathBuf;

/// Errors from loading a body catalog.
///
/// `Io` and `Metadata` are data-load failures; `Truncated` and `Integrity`
/// mean the binary was read but has the wrong shape. All are fatal to the
/// session's asteroid layer; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Reading or writing a catalog file failed.
    #[error("catalog I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata JSON could not be parsed or written.
    #[error("invalid catalog metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Byte length is not a whole number of `f32`s.
    #[error("catalog is {len} bytes, not a multiple of 4")]
    Truncated { len: usize },

    /// Float count is not a whole number of records.
    #[error("catalog holds {floats} floats, not a multiple of 9")]
    Integrity { floats: usize },
}

impl CatalogError {
    /// True for length/shape failures, false for I/O or parse failures.
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            CatalogError::Truncated { .. } | CatalogError::Integrity { .. }
        )
    }
}
