use chrono::NaiveDate;

use crate::assemble::assemble_manifest;
use crate::config::{ManifestConfig, SourceConfig};
use crate::consolidate::{consolidate_by_name, consolidate_identifier_group};
use crate::error::CoreError;
use crate::filter::group_eligible_rows;
use crate::model::{ManifestMeta, ManifestResult, ManifestSummary, RegistryRow, Status};
use crate::overlap::resolve_overlaps;

/// Run the consolidation pipeline over pre-loaded registry rows.
///
/// Strictly linear: filter → identifier consolidation → name consolidation
/// → overlap resolution → assembly. Each stage consumes the previous
/// stage's output as its sole input.
pub fn run(config: &ManifestConfig, rows: Vec<RegistryRow>) -> Result<ManifestResult, CoreError> {
    let input_rows = rows.len();

    let groups = group_eligible_rows(&config.eligibility, rows);
    let eligible_rows = groups.values().map(Vec::len).sum();
    let identifier_groups = groups.len();

    let mut consolidated = Vec::with_capacity(groups.len());
    for (isin, group) in &groups {
        consolidated.push(consolidate_identifier_group(isin, group)?);
    }

    let named = consolidate_by_name(consolidated)?;
    let name_groups = named.len();

    let winners = resolve_overlaps(named);
    let components = winners.len();

    let records = assemble_manifest(winners)?;

    Ok(ManifestResult {
        meta: ManifestMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary: ManifestSummary {
            input_rows,
            eligible_rows,
            identifier_groups,
            name_groups,
            components,
            records: records.len(),
        },
        records,
    })
}

/// Load registry rows from CSV data, applying the configured column
/// mapping. Header names are resolved once; a missing header is an error,
/// a missing value in a row is treated as empty.
pub fn load_registry_rows(
    csv_data: &str,
    source: &SourceConfig,
) -> Result<Vec<RegistryRow>, CoreError> {
    // Registry exports are often BOM-prefixed.
    let data = csv_data.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::Csv(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let col = &source.columns;

    let idx = |name: &str| -> Result<usize, CoreError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CoreError::MissingColumn { column: name.into() })
    };

    let isin_idx = idx(&col.isin)?;
    let record_type_idx = idx(&col.record_type)?;
    let category_idx = idx(&col.category)?;
    let status_idx = idx(&col.status)?;
    let aliases_idx = idx(&col.aliases)?;
    let fisn_idx = idx(&col.fisn)?;
    let name_idx = idx(&col.name)?;
    let added_date_idx = idx(&col.added_date)?;
    let links_idx = idx(&col.links)?;

    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| CoreError::Csv(e.to_string()))?;
        let field = |i: usize| record.get(i).unwrap_or("");

        rows.push(RegistryRow {
            isin: field(isin_idx).to_string(),
            record_type: field(record_type_idx).to_string(),
            category: field(category_idx).to_string(),
            status: Status::from_label(field(status_idx)),
            aliases: field(aliases_idx).to_string(),
            derived_alias: derived_alias_from_fisn(field(fisn_idx)),
            name: field(name_idx).to_string(),
            added_date: parse_added_date(field(added_date_idx)),
            link_count: count_links(field(links_idx)),
        });
    }

    Ok(rows)
}

/// Symbol segment of a structured FISN value: the part after the last `/`.
fn derived_alias_from_fisn(fisn: &str) -> Option<String> {
    if !fisn.contains('/') {
        return None;
    }
    let symbol = fisn.rsplit('/').next().unwrap_or("").trim();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol.to_string())
    }
}

/// Parse the registry's `MM/DD/YY` or `MM/DD/YYYY` date. Unparsable values
/// rank as lowest seniority and are never an error.
fn parse_added_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let format = match trimmed.rsplit('/').next() {
        Some(year) if year.len() == 2 => "%m/%d/%y",
        _ => "%m/%d/%Y",
    };
    NaiveDate::parse_from_str(trimmed, format).ok()
}

/// Cross-reference count: number of semicolon-separated linked entries.
fn count_links(raw: &str) -> u32 {
    if raw.trim().is_empty() {
        0
    } else {
        raw.split(';').count() as u32
    }
}
