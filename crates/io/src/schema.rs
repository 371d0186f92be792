// Identity schema validation

use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use serde::Serialize;

/// Compiled identity schema. Records are checked one at a time so a bad
/// record can be excluded and reported without failing the run.
#[derive(Debug)]
pub struct SchemaValidator {
    compiled: JSONSchema,
}

impl SchemaValidator {
    /// Compile the schema from disk. A missing or invalid schema file is an
    /// error; the caller treats it as fatal before any manifest is written.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("cannot read schema {}: {e}", path.display()))?;
        let schema: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| format!("cannot parse schema {}: {e}", path.display()))?;
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| format!("invalid schema {}: {e}", path.display()))?;
        Ok(Self { compiled })
    }

    /// Accept or reject one record. The rejection message joins every
    /// failed check into a single diagnostic line.
    pub fn validate<T: Serialize>(&self, record: &T) -> Result<(), String> {
        let value = serde_json::to_value(record).map_err(|e| e.to_string())?;
        if let Err(errors) = self.compiled.validate(&value) {
            let messages: Vec<String> = errors.map(|e| e.to_string()).collect();
            return Err(messages.join("; "));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonid_core::IdentityRecord;
    use tempfile::tempdir;

    const SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "isin": {"type": "string", "minLength": 1},
            "symbol": {"type": "string", "minLength": 1},
            "name": {"type": "string", "minLength": 1},
            "exchange": {"type": ["string", "null"]}
        },
        "required": ["isin", "symbol", "name"]
    }"#;

    fn validator() -> (tempfile::TempDir, SchemaValidator) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("identity.schema.json");
        std::fs::write(&path, SCHEMA).unwrap();
        let validator = SchemaValidator::from_file(&path).unwrap();
        (dir, validator)
    }

    #[test]
    fn valid_record_accepted() {
        let (_dir, validator) = validator();
        let record = IdentityRecord {
            isin: "XX0000000001".into(),
            symbol: "BTC;XBT".into(),
            name: "Bitcoin".into(),
            exchange: None,
        };
        assert!(validator.validate(&record).is_ok());
    }

    #[test]
    fn empty_symbol_rejected_with_diagnostic() {
        let (_dir, validator) = validator();
        let record = IdentityRecord {
            isin: "XX0000000001".into(),
            symbol: String::new(),
            name: "Bitcoin".into(),
            exchange: None,
        };
        let err = validator.validate(&record).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn missing_schema_file_is_error() {
        let dir = tempdir().unwrap();
        let err = SchemaValidator::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.contains("cannot read schema"));
    }

    #[test]
    fn malformed_schema_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = SchemaValidator::from_file(&path).unwrap_err();
        assert!(err.contains("cannot parse schema"));
    }
}
