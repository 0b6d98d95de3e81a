//! The loaded catalog and its loaders.

use std::borrow::Cow;
use std::path::Path;

use orrery_orbit::OrbitalElements;
use tracing::{info, instrument, warn};

use crate::error::CatalogError;
use crate::metadata::CatalogMetadata;
use crate::palette::{MAX_CLASSES, Palette};
use crate::record::{BodyRecord, FLOATS_PER_RECORD, RECORD_STRIDE};

/// Immutable body store. A body's index is its handle for the session.
#[derive(Debug, Clone, Default)]
pub struct BodyCatalog {
    records: Vec<BodyRecord>,
    metadata: CatalogMetadata,
}

impl BodyCatalog {
    /// Build from already-decoded parts.
    pub fn from_parts(records: Vec<BodyRecord>, metadata: CatalogMetadata) -> Self {
        if metadata.classes.len() > MAX_CLASSES {
            warn!(
                classes = metadata.classes.len(),
                "more classes than palette slots, extra classes use the default colour"
            );
        }
        let degenerate = records.iter().filter(|r| !r.is_elliptical()).count();
        if degenerate > 0 {
            warn!(degenerate, "records with e outside [0, 1) or invalid q");
        }
        Self { records, metadata }
    }

    /// Read the binary catalog and its metadata from disk.
    #[instrument(skip_all, fields(catalog = %catalog_path.display()))]
    pub fn load(catalog_path: &Path, metadata_path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(catalog_path).map_err(|source| CatalogError::Io {
            path: catalog_path.to_path_buf(),
            source,
        })?;
        let records = parse_records(&bytes)?;

        let json = std::fs::read(metadata_path).map_err(|source| CatalogError::Io {
            path: metadata_path.to_path_buf(),
            source,
        })?;
        let metadata: CatalogMetadata =
            serde_json::from_slice(&json).map_err(|source| CatalogError::Metadata {
                path: metadata_path.to_path_buf(),
                source,
            })?;

        info!(
            bodies = records.len(),
            classes = metadata.classes.len(),
            "Loaded catalog"
        );
        Ok(Self::from_parts(records, metadata))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BodyRecord] {
        &self.records
    }

    pub fn record(&self, index: usize) -> Option<&BodyRecord> {
        self.records.get(index)
    }

    pub fn metadata(&self) -> &CatalogMetadata {
        &self.metadata
    }

    /// Host-precision elements of body `index`.
    pub fn elements(&self, index: usize) -> Option<OrbitalElements> {
        self.records.get(index).map(BodyRecord::elements)
    }

    pub fn id(&self, index: usize) -> Cow<'_, str> {
        self.metadata.id(index)
    }

    pub fn name(&self, index: usize) -> Cow<'_, str> {
        self.metadata.name(index)
    }

    /// Class code of body `index`, `"Unknown"` if unresolvable.
    pub fn class_name(&self, index: usize) -> &str {
        let class_index = self.records.get(index).and_then(BodyRecord::class_index);
        self.metadata.class_name(class_index)
    }

    pub fn palette(&self) -> Palette {
        Palette::from_classes(&self.metadata.classes)
    }

    /// Raw instance bytes for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }
}

/// Decode a little-endian binary catalog.
pub(crate) fn parse_records(bytes: &[u8]) -> Result<Vec<BodyRecord>, CatalogError> {
    if bytes.len() % 4 != 0 {
        return Err(CatalogError::Truncated { len: bytes.len() });
    }
    let floats = bytes.len() / 4;
    if floats % FLOATS_PER_RECORD != 0 {
        return Err(CatalogError::Integrity { floats });
    }
    Ok(bytes
        .chunks_exact(RECORD_STRIDE)
        .map(BodyRecord::from_le_bytes)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::CatalogWriter;

    fn record(e: f32, q: f32, class_id: f32) -> BodyRecord {
        BodyRecord {
            eccentricity: e,
            periapsis_distance: q,
            epoch_mjd: 59000.0,
            diameter_km: 10.0,
            class_id,
            ..Default::default()
        }
    }

    fn metadata() -> CatalogMetadata {
        CatalogMetadata {
            classes: vec!["MBA".into(), "APO".into()],
            ids: vec!["101".into(), "102".into()],
            names: vec!["Alpha".into(), "Beta".into()],
        }
    }

    #[test]
    fn test_load_written_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record(0.1, 0.9, 0.0), record(0.3, 1.2, 1.0)];
        let metadata = metadata();
        let writer = CatalogWriter::new(&records, &metadata);
        let (bin, meta) = writer.write_to_dir(dir.path(), "belt").unwrap();

        let catalog = BodyCatalog::load(&bin, &meta).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records(), records.as_slice());
        assert_eq!(catalog.name(1), "Beta");
        assert_eq!(catalog.class_name(1), "APO");
        assert_eq!(catalog.as_bytes().len(), 72);
    }

    #[test]
    fn test_length_not_multiple_of_nine_is_integrity_error() {
        let bytes = vec![0u8; 4 * 10];
        let err = parse_records(&bytes).unwrap_err();
        assert!(matches!(err, CatalogError::Integrity { floats: 10 }));
        assert!(err.is_integrity());
    }

    #[test]
    fn test_partial_float_is_truncated_error() {
        let err = parse_records(&[0u8; 37]).unwrap_err();
        assert!(matches!(err, CatalogError::Truncated { len: 37 }));
    }

    #[test]
    fn test_empty_file_is_empty_catalog() {
        assert!(parse_records(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BodyCatalog::load(&dir.path().join("nope.bin"), &dir.path().join("nope.json"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
        assert!(!err.is_integrity());
    }

    #[test]
    fn test_bad_metadata_is_metadata_error() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("a.bin");
        let meta = dir.path().join("a.json");
        std::fs::write(&bin, [0u8; 36]).unwrap();
        std::fs::write(&meta, "not json").unwrap();
        let err = BodyCatalog::load(&bin, &meta).unwrap_err();
        assert!(matches!(err, CatalogError::Metadata { .. }));
    }

    #[test]
    fn test_out_of_range_class_degrades() {
        let catalog = BodyCatalog::from_parts(vec![record(0.1, 1.0, 40.0)], metadata());
        assert_eq!(catalog.class_name(0), "Unknown");
        assert_eq!(
            catalog.palette().color_for(40.0),
            catalog.palette().default_color
        );
    }

    #[test]
    fn test_elements_widen_record() {
        let catalog = BodyCatalog::from_parts(vec![record(0.5, 2.0, 0.0)], metadata());
        let elements = catalog.elements(0).unwrap();
        assert_eq!(elements.eccentricity, 0.5);
        assert_eq!(elements.semi_major_axis(), 4.0);
        assert!(catalog.elements(1).is_none());
    }
}
