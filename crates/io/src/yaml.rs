// Manifest YAML serialization

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use canonid_core::IdentityRecord;
use serde::Serialize;

/// Write a manifest, creating parent directories as needed. Records are
/// emitted in the given order with struct field order preserved; the
/// downstream field-order contract lives on the record types themselves.
pub fn write_manifest<T: Serialize>(path: &Path, records: &[T]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
    }
    let file = File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_yaml::to_writer(writer, records)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// Read a previously written manifest, e.g. for alias enrichment lookups.
pub fn read_manifest(path: &Path) -> Result<Vec<IdentityRecord>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_yaml::from_str(&content).map_err(|e| format!("cannot parse {}: {e}", path.display()))
}
