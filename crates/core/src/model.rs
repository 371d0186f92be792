use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Registry-assigned quality tier. Lower [`priority`](Status::priority) is
/// more trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Status {
    Validated,
    Provisional,
    Private,
    Reserved,
    Other,
}

impl Status {
    /// Map a registry status label onto a tier. Unknown labels are `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Validated" => Self::Validated,
            "Provisional" => Self::Provisional,
            "Private" => Self::Private,
            "Reserved" => Self::Reserved,
            _ => Self::Other,
        }
    }

    /// Numeric rank used by the consolidation orderings.
    pub fn priority(self) -> u8 {
        match self {
            Self::Validated => 1,
            Self::Provisional => 2,
            Self::Private => 3,
            Self::Reserved => 4,
            Self::Other => 99,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validated => write!(f, "Validated"),
            Self::Provisional => write!(f, "Provisional"),
            Self::Private => write!(f, "Private"),
            Self::Reserved => write!(f, "Reserved"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A single entry from the registry export. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct RegistryRow {
    pub isin: String,
    pub record_type: String,
    pub category: String,
    pub status: Status,
    /// Semicolon-delimited short codes, raw. Split and normalized during
    /// consolidation, not at load time.
    pub aliases: String,
    /// Symbol segment of the structured FISN field, when present.
    pub derived_alias: Option<String>,
    pub name: String,
    /// `None` when the registry field is missing or unparsable.
    pub added_date: Option<NaiveDate>,
    /// Number of cross-referenced related entries.
    pub link_count: u32,
}

impl RegistryRow {
    /// Date used for seniority ranking. Missing dates rank last.
    pub fn seniority(&self) -> NaiveDate {
        self.added_date.unwrap_or(NaiveDate::MAX)
    }
}

// ---------------------------------------------------------------------------
// Intermediate
// ---------------------------------------------------------------------------

/// One merged identity produced by the identifier and name consolidation
/// stages. The alias set is the union over all merged sources; the name and
/// ranking attributes come from the stage winner only.
#[derive(Debug, Clone)]
pub struct ConsolidatedRecord {
    pub isin: String,
    /// Normalized (trimmed, uppercased) alias codes.
    pub aliases: BTreeSet<String>,
    pub name: String,
    pub status_priority: u8,
    pub link_count: u32,
    pub added_date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One manifest entry. Field order is the serialization contract with
/// downstream consumers; do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub isin: String,
    /// Ordered alias codes joined with `;` (shortest first, then
    /// lexicographic).
    pub symbol: String,
    pub name: String,
    /// Populated by the listing pipeline, null in registry manifests.
    pub exchange: Option<String>,
}

impl IdentityRecord {
    /// The individual alias codes of this record.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.symbol.split(';').filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Run output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ManifestSummary {
    pub input_rows: usize,
    pub eligible_rows: usize,
    pub identifier_groups: usize,
    pub name_groups: usize,
    pub components: usize,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ManifestResult {
    pub meta: ManifestMeta,
    pub summary: ManifestSummary,
    pub records: Vec<IdentityRecord>,
}
