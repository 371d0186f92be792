//! `canonid ingest catalog` — asset-catalog manifest keyed by FIGI, with
//! alias enrichment from an existing registry manifest.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::PathBuf;

use canonid_core::IdentityRecord;
use canonid_io::schema::SchemaValidator;
use serde::Serialize;

use crate::exit_codes;
use crate::CliError;

// ── Catalog record ──────────────────────────────────────────────────

/// One catalog entry. The vendor issues FIGIs, so the FIGI is the
/// authoritative identifier in this manifest. Field order is the
/// serialization contract.
#[derive(Debug, Clone, Serialize)]
struct CatalogRecord {
    figi: String,
    symbol: String,
    name: String,
    exchange: Option<String>,
}

// ── Catalog parsing ─────────────────────────────────────────────────

#[derive(Debug)]
struct CatalogRow {
    figi: String,
    isin: String,
    symbol: String,
    name: String,
}

/// Parse the vendor catalog CSV, keeping rows with a FIGI, symbol, and
/// name in the requested asset class.
fn parse_catalog(csv_data: &str, asset_class: &str) -> Result<Vec<CatalogRow>, String> {
    let data = csv_data.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, String> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| format!("catalog missing column '{name}'"))
    };

    let figi_idx = idx("FIGI Code")?;
    let isin_idx = idx("ISIN")?;
    let symbol_idx = idx("Code")?;
    let name_idx = idx("Asset Name")?;
    let class_idx = idx("Asset Class")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        if field(class_idx) != asset_class {
            continue;
        }
        let figi = field(figi_idx);
        let symbol = field(symbol_idx);
        let name = field(name_idx);
        if figi.is_empty() || symbol.is_empty() || name.is_empty() {
            continue;
        }

        rows.push(CatalogRow {
            figi: figi.to_string(),
            isin: field(isin_idx).to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
        });
    }

    Ok(rows)
}

// ── Enrichment ──────────────────────────────────────────────────────

/// Union registry aliases into the catalog symbol when the ISIN matches.
/// Purely additive: the catalog's own symbol always stays. This variant
/// orders the merged aliases lexicographically.
fn enrich_symbol(symbol: &str, isin: &str, registry: &HashMap<String, IdentityRecord>) -> String {
    let own = symbol.to_uppercase();
    if isin.is_empty() {
        return own;
    }
    let Some(record) = registry.get(isin) else {
        return own;
    };

    let mut aliases: BTreeSet<String> = BTreeSet::new();
    aliases.insert(own.clone());
    for alias in record.aliases() {
        aliases.insert(alias.to_uppercase());
    }
    if aliases.len() > 1 {
        aliases.into_iter().collect::<Vec<_>>().join(";")
    } else {
        own
    }
}

// ── Entry point ─────────────────────────────────────────────────────

pub fn cmd_ingest_catalog(
    input_dir: PathBuf,
    registry_manifest: Option<PathBuf>,
    schema: PathBuf,
    out: PathBuf,
    asset_class: String,
    quiet: bool,
) -> Result<(), CliError> {
    let stderr_tty = atty::is(atty::Stream::Stderr);
    let show_progress = !quiet && stderr_tty;

    let input = canonid_io::discover::latest_dated_file(&input_dir, r"^asset_catalog_(\d{8})\.csv$")
        .map_err(CliError::args)?
        .ok_or_else(|| CliError {
            code: exit_codes::EXIT_INGEST_NO_INPUT,
            message: format!("no catalog exports in {}", input_dir.display()),
            hint: Some("place a dated asset_catalog_<YYYYMMDD>.csv under the input directory".into()),
        })?;

    let validator = SchemaValidator::from_file(&schema).map_err(|msg| CliError {
        code: exit_codes::EXIT_INGEST_SCHEMA,
        message: msg,
        hint: None,
    })?;

    // Registry lookup for ISIN-based alias enrichment. A missing manifest
    // is only a warning; the catalog stands on its own.
    let mut registry: HashMap<String, IdentityRecord> = HashMap::new();
    if let Some(path) = &registry_manifest {
        match canonid_io::yaml::read_manifest(path) {
            Ok(records) => {
                for record in records {
                    registry.insert(record.isin.clone(), record);
                }
                if show_progress {
                    eprintln!("Loaded {} registry records for enrichment", registry.len());
                }
            }
            Err(msg) => eprintln!("warning: enrichment unavailable: {msg}"),
        }
    }

    if show_progress {
        eprintln!("Processing latest file: {}", input.display());
    }

    let csv_data = fs::read_to_string(&input)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", input.display())))?;
    let rows = parse_catalog(&csv_data, &asset_class).map_err(|msg| CliError {
        code: exit_codes::EXIT_INGEST_PARSE,
        message: msg,
        hint: None,
    })?;

    // Enrich, then dedup by symbol first-wins.
    let mut seen: HashSet<String> = HashSet::new();
    let mut enriched = 0usize;
    let mut records = Vec::new();
    for row in &rows {
        let symbol = enrich_symbol(&row.symbol, &row.isin, &registry);
        if symbol.contains(';') {
            enriched += 1;
        }
        if !seen.insert(symbol.clone()) {
            continue;
        }
        records.push(CatalogRecord {
            figi: row.figi.clone(),
            symbol,
            name: row.name.clone(),
            exchange: None,
        });
    }

    // Schema rejections exclude the record but never fail the run.
    let mut validated = Vec::with_capacity(records.len());
    let mut rejected = 0usize;
    for record in records {
        match validator.validate(&record) {
            Ok(()) => validated.push(record),
            Err(msg) => {
                rejected += 1;
                eprintln!("warning: schema rejected {}: {}", record.symbol, msg);
            }
        }
    }

    canonid_io::yaml::write_manifest(&out, &validated).map_err(CliError::io)?;

    if show_progress {
        eprintln!("Catalog rows:     {}", rows.len());
        eprintln!("Enriched symbols: {}", enriched);
        if rejected > 0 {
            eprintln!("Schema rejected:  {}", rejected);
        }
        eprintln!(
            "Done: {} assets written to {}",
            validated.len(),
            out.display(),
        );
    }

    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
FIGI Code,ISIN,Code,Asset Name,Asset Class
BBG000000001,XX0000000001,btc,Bitcoin,cryptocurrency
BBG000000002,,ETH,Ether,cryptocurrency
BBG000000003,XX0000000003,AAPL,Apple Inc,equity
BBG000000004,XX0000000004,,No Symbol,cryptocurrency
";

    fn registry_with(isin: &str, symbol: &str) -> HashMap<String, IdentityRecord> {
        let record = IdentityRecord {
            isin: isin.into(),
            symbol: symbol.into(),
            name: "Bitcoin".into(),
            exchange: None,
        };
        HashMap::from([(record.isin.clone(), record)])
    }

    #[test]
    fn parse_keeps_asset_class_and_required_fields() {
        let rows = parse_catalog(CSV, "cryptocurrency").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "btc");
        assert_eq!(rows[1].figi, "BBG000000002");
    }

    #[test]
    fn parse_bom_header() {
        let bom_csv = format!("\u{feff}{CSV}");
        let rows = parse_catalog(&bom_csv, "cryptocurrency").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn parse_missing_column_is_named() {
        let err = parse_catalog("FIGI Code,Code\n", "cryptocurrency").unwrap_err();
        assert!(err.contains("'ISIN'"));
    }

    #[test]
    fn enrichment_unions_registry_aliases() {
        let registry = registry_with("XX0000000001", "BTC;XBT");
        let symbol = enrich_symbol("btc", "XX0000000001", &registry);
        assert_eq!(symbol, "BTC;XBT");

        let symbol = enrich_symbol("wbtc", "XX0000000001", &registry);
        assert_eq!(symbol, "BTC;WBTC;XBT");
    }

    #[test]
    fn enrichment_skips_unknown_identifier() {
        let registry = registry_with("XX0000000001", "BTC;XBT");
        assert_eq!(enrich_symbol("eth", "XX0000000099", &registry), "ETH");
        assert_eq!(enrich_symbol("eth", "", &registry), "ETH");
    }
}
