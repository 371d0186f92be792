// Raw vendor JSON files (mapping pulls, instrument universes)

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;

/// Read a raw vendor file as a JSON array of records. Provider exports are
/// sometimes BOM-prefixed.
pub fn read_records(path: &Path) -> Result<Vec<Value>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let trimmed = content.trim_start_matches('\u{feff}');
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;

    match value {
        Value::Array(items) => Ok(items),
        _ => Err(format!("{}: expected a JSON array of records", path.display())),
    }
}

/// Write records as a pretty-printed JSON array, creating parent
/// directories as needed.
pub fn write_records(path: &Path, records: &[Value]) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
    }
    let file = File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, records)
        .map_err(|e| format!("cannot write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw/mapping.json");

        let records = vec![
            serde_json::json!({"symbol": "BTC", "figi": "BBG000000001"}),
            serde_json::json!({"symbol": "ETH", "figi": null}),
        ];
        write_records(&path, &records).unwrap();

        let read = read_records(&path).unwrap();
        assert_eq!(read, records);
    }

    #[test]
    fn bom_prefix_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.json");
        std::fs::write(&path, "\u{feff}[{\"symbol\": \"BTC\"}]").unwrap();

        let read = read_records(&path).unwrap();
        assert_eq!(read.len(), 1);
    }

    #[test]
    fn non_array_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("object.json");
        std::fs::write(&path, "{\"data\": []}").unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(err.contains("expected a JSON array"));
    }
}
