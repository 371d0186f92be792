use serde::Deserialize;

use crate::error::CoreError;
use crate::model::Status;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ManifestConfig {
    pub name: String,
    pub source: SourceConfig,
    pub eligibility: EligibilityConfig,
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Directory holding dated registry exports.
    pub directory: String,
    /// Filename regex with one capture group for the date stamp.
    pub pattern: String,
    pub columns: ColumnMapping,
}

/// Header names in the registry export. The engine never assumes column
/// positions, only names.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMapping {
    pub isin: String,
    pub record_type: String,
    pub category: String,
    pub status: String,
    pub aliases: String,
    pub fisn: String,
    pub name: String,
    pub added_date: String,
    pub links: String,
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct EligibilityConfig {
    /// Required instrument-type tag; rows with any other type are dropped.
    pub record_type: String,
    /// Required classification tag.
    pub category: String,
    #[serde(default = "default_excluded_statuses")]
    pub excluded_statuses: Vec<Status>,
}

fn default_excluded_statuses() -> Vec<Status> {
    vec![Status::Private, Status::Reserved]
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Manifest destination path.
    pub manifest: String,
    /// Identity schema used to validate records before writing.
    pub schema: String,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ManifestConfig {
    pub fn from_toml(input: &str) -> Result<Self, CoreError> {
        let config: ManifestConfig =
            toml::from_str(input).map_err(|e| CoreError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigValidation("name must not be empty".into()));
        }
        if self.source.directory.trim().is_empty() {
            return Err(CoreError::ConfigValidation(
                "source.directory must not be empty".into(),
            ));
        }
        if self.source.pattern.trim().is_empty() {
            return Err(CoreError::ConfigValidation(
                "source.pattern must not be empty".into(),
            ));
        }
        if self.eligibility.record_type.trim().is_empty() {
            return Err(CoreError::ConfigValidation(
                "eligibility.record_type must not be empty".into(),
            ));
        }
        if self.eligibility.category.trim().is_empty() {
            return Err(CoreError::ConfigValidation(
                "eligibility.category must not be empty".into(),
            ));
        }
        if self.output.manifest.trim().is_empty() {
            return Err(CoreError::ConfigValidation(
                "output.manifest must not be empty".into(),
            ));
        }
        if self.output.schema.trim().is_empty() {
            return Err(CoreError::ConfigValidation(
                "output.schema must not be empty".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Crypto registry manifest"

[source]
directory = "data/raw/registry"
pattern = '^instrument-list-(\d{8})\.csv$'

[source.columns]
isin = "ISIN"
record_type = "Type"
category = "CFI"
status = "Status"
aliases = "Short Name"
fisn = "FISN"
name = "Long Name"
added_date = "Added Date"
links = "Linked Identifiers"

[eligibility]
record_type = "Referential Instrument"
category = "TMXXXX"

[output]
manifest = "manifests/crypto/crypto.yaml"
schema = "schemas/identity.schema.json"
"#;

    #[test]
    fn parse_valid() {
        let config = ManifestConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Crypto registry manifest");
        assert_eq!(config.source.columns.isin, "ISIN");
        assert_eq!(config.eligibility.record_type, "Referential Instrument");
        assert_eq!(
            config.eligibility.excluded_statuses,
            vec![Status::Private, Status::Reserved],
        );
    }

    #[test]
    fn excluded_statuses_override() {
        let input = VALID.replace(
            "category = \"TMXXXX\"",
            "category = \"TMXXXX\"\nexcluded_statuses = [\"Reserved\"]",
        );
        let config = ManifestConfig::from_toml(&input).unwrap();
        assert_eq!(config.eligibility.excluded_statuses, vec![Status::Reserved]);
    }

    #[test]
    fn reject_unknown_status_label() {
        let input = VALID.replace(
            "category = \"TMXXXX\"",
            "category = \"TMXXXX\"\nexcluded_statuses = [\"Revoked\"]",
        );
        assert!(ManifestConfig::from_toml(&input).is_err());
    }

    #[test]
    fn reject_empty_name() {
        let input = VALID.replace("Crypto registry manifest", "  ");
        let err = ManifestConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn reject_missing_columns_table() {
        let input = VALID.replace("[source.columns]", "[source.colums]");
        assert!(ManifestConfig::from_toml(&input).is_err());
    }
}
