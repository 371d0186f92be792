//! `canonid ingest securities` — listed-securities manifest from the
//! latest universe pull.

use std::collections::BTreeMap;
use std::path::PathBuf;

use canonid_core::IdentityRecord;
use serde_json::Value;

use crate::exit_codes;
use crate::CliError;

// ── Venue mapping ───────────────────────────────────────────────────

/// Provider venue labels to ISO 10383 MIC codes. Venues outside this table
/// keep a null exchange.
const VENUE_MIC: &[(&str, &str)] = &[
    ("NASDAQ", "XNAS"),
    ("NYSE", "XNYS"),
    ("NYSE ARCA", "ARCX"),
    ("NYSE MKT", "XASE"),
];

fn venue_mic(venue: &str) -> Option<String> {
    VENUE_MIC
        .iter()
        .find(|(label, _)| *label == venue)
        .map(|(_, mic)| (*mic).to_string())
}

// ── Record building ─────────────────────────────────────────────────

/// Reduce raw universe entries to one unique `(symbol, name)` → identifier
/// mapping, sorted by symbol. When the same pair appears on several
/// venues, the entry with a mapped exchange wins.
fn build_securities(entries: &[Value]) -> Vec<IdentityRecord> {
    let mut unique: BTreeMap<(String, String), IdentityRecord> = BTreeMap::new();

    for entry in entries {
        let isin = entry["Isin"].as_str().unwrap_or("").trim();
        if isin.is_empty() || isin == "Unknown" {
            continue;
        }
        let symbol = entry["Code"].as_str().unwrap_or("").trim();
        let name = entry["Name"].as_str().unwrap_or("").trim();
        if symbol.is_empty() || name.is_empty() {
            continue;
        }

        let exchange = venue_mic(entry["Exchange"].as_str().unwrap_or("").trim());
        let record = IdentityRecord {
            isin: isin.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            exchange,
        };

        let key = (record.symbol.clone(), record.name.clone());
        match unique.get(&key) {
            None => {
                unique.insert(key, record);
            }
            Some(existing) if existing.exchange.is_none() && record.exchange.is_some() => {
                unique.insert(key, record);
            }
            Some(_) => {}
        }
    }

    let mut records: Vec<IdentityRecord> = unique.into_values().collect();
    records.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    records
}

// ── Entry point ─────────────────────────────────────────────────────

pub fn cmd_ingest_securities(
    input_dir: PathBuf,
    exchange: String,
    out: PathBuf,
    quiet: bool,
) -> Result<(), CliError> {
    let stderr_tty = atty::is(atty::Stream::Stderr);
    let show_progress = !quiet && stderr_tty;

    let pattern = format!(r"^universe_{}_(\d{{8}})\.json$", exchange.to_lowercase());
    let input = canonid_io::discover::latest_dated_file(&input_dir, &pattern)
        .map_err(CliError::args)?
        .ok_or_else(|| CliError {
            code: exit_codes::EXIT_INGEST_NO_INPUT,
            message: format!("no universe pulls in {}", input_dir.display()),
            hint: Some("run `canonid fetch universe` first".into()),
        })?;

    if show_progress {
        eprintln!("Processing latest file: {}", input.display());
    }

    let entries = canonid_io::json::read_records(&input).map_err(|msg| CliError {
        code: exit_codes::EXIT_INGEST_PARSE,
        message: msg,
        hint: None,
    })?;

    let records = build_securities(&entries);

    canonid_io::yaml::write_manifest(&out, &records).map_err(CliError::io)?;

    if show_progress {
        eprintln!(
            "Done: {} securities written to {}",
            records.len(),
            out.display(),
        );
    }

    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────
