use std::fmt;

#[derive(Debug)]
pub enum CoreError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty name, missing column mapping, etc.).
    ConfigValidation(String),
    /// Missing required column in the registry export.
    MissingColumn { column: String },
    /// CSV read error.
    Csv(String),
    /// A consolidation stage received an empty group. Groups are built from
    /// non-empty partitions, so this is a contract violation.
    EmptyGroup(String),
    /// A record reached assembly with no aliases, which signals corrupted
    /// upstream data.
    EmptyAliasSet { isin: String },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingColumn { column } => {
                write!(f, "registry export missing column '{column}'")
            }
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::EmptyGroup(key) => {
                write!(f, "internal error: empty consolidation group for key '{key}'")
            }
            Self::EmptyAliasSet { isin } => {
                write!(f, "record '{isin}' has no aliases; upstream data is corrupt")
            }
        }
    }
}

impl std::error::Error for CoreError {}
