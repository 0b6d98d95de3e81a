//! Serialise records and metadata in the exact format [`BodyCatalog::load`]
//! reads.
//!
//! [`BodyCatalog::load`]: crate::BodyCatalog::load

use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::metadata::CatalogMetadata;
use crate::record::{BodyRecord, RECORD_STRIDE};

/// Borrowed view of a catalog to be written.
pub struct CatalogWriter<'a> {
    records: &'a [BodyRecord],
    metadata: &'a CatalogMetadata,
}

impl<'a> CatalogWriter<'a> {
    pub fn new(records: &'a [BodyRecord], metadata: &'a CatalogMetadata) -> Self {
        Self { records, metadata }
    }

    /// Little-endian binary body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.records.len() * RECORD_STRIDE);
        for record in self.records {
            record.write_le_bytes(&mut out);
        }
        out
    }

    /// Write `<stem>.bin` and `<stem>.json` into `dir`, returning both paths.
    pub fn write_to_dir(&self, dir: &Path, stem: &str) -> Result<(PathBuf, PathBuf), CatalogError> {
        std::fs::create_dir_all(dir).map_err(|source| CatalogError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let bin_path = dir.join(format!("{stem}.bin"));
        let meta_path = dir.join(format!("{stem}.json"));
        self.write(&bin_path, &meta_path)?;
        Ok((bin_path, meta_path))
    }

    /// Write the binary and metadata files to explicit paths.
    pub fn write(&self, bin_path: &Path, meta_path: &Path) -> Result<(), CatalogError> {
        std::fs::write(bin_path, self.to_bytes()).map_err(|source| CatalogError::Io {
            path: bin_path.to_path_buf(),
            source,
        })?;
        let json = serde_json::to_vec(self.metadata).map_err(|source| CatalogError::Metadata {
            path: meta_path.to_path_buf(),
            source,
        })?;
        std::fs::write(meta_path, json).map_err(|source| CatalogError::Io {
            path: meta_path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_are_little_endian_in_field_order() {
        let record = BodyRecord {
            eccentricity: 1.0,
            class_id: 2.0,
            ..Default::default()
        };
        let meta = CatalogMetadata::default();
        let bytes = CatalogWriter::new(std::slice::from_ref(&record), &meta).to_bytes();
        assert_eq!(bytes.len(), 36);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[32..36], &2.0f32.to_le_bytes());
    }

    #[test]
    fn test_metadata_json_has_expected_keys() {
        let dir = tempfile::tempdir().unwrap();
        let meta = CatalogMetadata {
            classes: vec!["MBA".into()],
            ids: vec!["1".into()],
            names: vec!["Ceres".into()],
        };
        let (_, meta_path) = CatalogWriter::new(&[], &meta)
            .write_to_dir(dir.path(), "tiny")
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(meta_path).unwrap()).unwrap();
        assert_eq!(value["classes"][0], "MBA");
        assert_eq!(value["ids"][0], "1");
        assert_eq!(value["names"][0], "Ceres");
    }
}
