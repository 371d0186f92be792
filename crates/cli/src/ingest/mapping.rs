//! `canonid ingest mapping` — clean the latest raw identifier-mapping pull
//! into a dated working file.

use std::collections::HashSet;
use std::path::PathBuf;

use serde_json::Value;

use crate::exit_codes;
use crate::fetch::common::dated_output_path;
use crate::CliError;

/// Drop entries with a null FIGI, then dedup symbols first-wins. Returns
/// the surviving records plus (null-FIGI, duplicate-symbol) removal counts.
fn clean_mapping(records: Vec<Value>) -> (Vec<Value>, usize, usize) {
    let total = records.len();
    let with_figi: Vec<Value> = records
        .into_iter()
        .filter(|r| !r["figi"].is_null())
        .collect();
    let null_figi = total - with_figi.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();
    for record in with_figi {
        let symbol = record["symbol"].as_str().unwrap_or("").to_string();
        if seen.insert(symbol) {
            unique.push(record);
        }
    }
    let duplicates = total - null_figi - unique.len();

    (unique, null_figi, duplicates)
}

pub fn cmd_ingest_mapping(
    input_dir: PathBuf,
    exchange: String,
    quiet: bool,
) -> Result<(), CliError> {
    let stderr_tty = atty::is(atty::Stream::Stderr);
    let show_progress = !quiet && stderr_tty;

    let ex = exchange.to_lowercase();
    let pattern = format!(r"^id_mapping_{ex}_raw_(\d{{8}})\.json$");
    let input = canonid_io::discover::latest_dated_file(&input_dir, &pattern)
        .map_err(CliError::args)?
        .ok_or_else(|| CliError {
            code: exit_codes::EXIT_INGEST_NO_INPUT,
            message: format!("no raw mapping pulls in {}", input_dir.display()),
            hint: Some("run `canonid fetch mapping` first".into()),
        })?;

    if show_progress {
        eprintln!("Processing latest file: {}", input.display());
    }

    let records = canonid_io::json::read_records(&input).map_err(|msg| CliError {
        code: exit_codes::EXIT_INGEST_PARSE,
        message: msg,
        hint: None,
    })?;
    let total = records.len();

    let (unique, null_figi, duplicates) = clean_mapping(records);

    let out_path = dated_output_path(&input_dir, &format!("id_mapping_{ex}"));
    canonid_io::json::write_records(&out_path, &unique).map_err(CliError::io)?;

    if show_progress {
        eprintln!("Loaded:             {}", total);
        eprintln!("Removed null FIGI:  {}", null_figi);
        eprintln!("Removed duplicates: {}", duplicates);
        eprintln!(
            "Done: {} records written to {}",
            unique.len(),
            out_path.display(),
        );
    }

    Ok(())
}
