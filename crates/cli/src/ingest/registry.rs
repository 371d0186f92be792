//! `canonid ingest registry` — run the consolidation pipeline over the
//! latest registry export and write the identity manifest.

use std::fs;
use std::path::{Path, PathBuf};

use canonid_core::config::ManifestConfig;
use canonid_core::engine::{load_registry_rows, run};
use canonid_io::schema::SchemaValidator;

use crate::exit_codes;
use crate::CliError;

pub fn cmd_ingest_registry(config_path: PathBuf, quiet: bool) -> Result<(), CliError> {
    let stderr_tty = atty::is(atty::Stream::Stderr);
    let show_progress = !quiet && stderr_tty;

    let config_text = fs::read_to_string(&config_path).map_err(|e| {
        CliError::args(format!("cannot read config {}: {e}", config_path.display()))
    })?;
    let config = ManifestConfig::from_toml(&config_text).map_err(|e| CliError::args(e.to_string()))?;

    // Required external files resolve before any work so a bad setup never
    // leaves a partial manifest behind.
    let source_dir = Path::new(&config.source.directory);
    let input = canonid_io::discover::latest_dated_file(source_dir, &config.source.pattern)
        .map_err(CliError::args)?
        .ok_or_else(|| CliError {
            code: exit_codes::EXIT_INGEST_NO_INPUT,
            message: format!(
                "no files matching {} in {}",
                config.source.pattern,
                source_dir.display(),
            ),
            hint: Some("place a dated registry export under the source directory".into()),
        })?;

    let validator = SchemaValidator::from_file(Path::new(&config.output.schema))
        .map_err(|msg| CliError {
            code: exit_codes::EXIT_INGEST_SCHEMA,
            message: msg,
            hint: None,
        })?;

    if show_progress {
        eprintln!("Processing latest file: {}", input.display());
    }

    let csv_data = fs::read_to_string(&input)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", input.display())))?;
    let rows = load_registry_rows(&csv_data, &config.source).map_err(|e| CliError {
        code: exit_codes::EXIT_INGEST_PARSE,
        message: e.to_string(),
        hint: None,
    })?;

    let result = run(&config, rows).map_err(|e| CliError {
        code: exit_codes::EXIT_INGEST_INVARIANT,
        message: e.to_string(),
        hint: None,
    })?;
    let summary = result.summary.clone();

    // Schema rejections exclude the record but never fail the run.
    let mut validated = Vec::with_capacity(result.records.len());
    let mut rejected = 0usize;
    for record in result.records {
        match validator.validate(&record) {
            Ok(()) => validated.push(record),
            Err(msg) => {
                rejected += 1;
                eprintln!("warning: schema rejected {}: {}", record.isin, msg);
            }
        }
    }

    let manifest_path = Path::new(&config.output.manifest);
    canonid_io::yaml::write_manifest(manifest_path, &validated).map_err(CliError::io)?;

    if show_progress {
        eprintln!("Eligible rows:        {}", summary.eligible_rows);
        eprintln!("Unique identifiers:   {}", summary.identifier_groups);
        eprintln!("Name-consolidated:    {}", summary.name_groups);
        eprintln!("Overlap-pruned:       {}", summary.components);
        if rejected > 0 {
            eprintln!("Schema rejected:      {}", rejected);
        }
        eprintln!(
            "Done: {} records written to {}",
            validated.len(),
            manifest_path.display(),
        );
    }

    Ok(())
}
