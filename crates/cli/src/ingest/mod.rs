//! `canonid ingest` — build manifests from raw reference files.

mod catalog;
mod mapping;
mod registry;
mod securities;

use std::path::PathBuf;

use clap::Subcommand;

use crate::CliError;

#[derive(Subcommand)]
pub enum IngestCommands {
    /// Consolidate the latest registry export into an identity manifest
    #[command(after_help = "\
Examples:
  canonid ingest registry configs/crypto.toml
  canonid ingest registry configs/crypto.toml -q")]
    Registry {
        /// Pipeline config TOML
        config: PathBuf,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Build the listed-securities manifest from the latest universe pull
    #[command(after_help = "\
Examples:
  canonid ingest securities
  canonid ingest securities --input-dir data/raw/refdata --out manifests/securities/securities.yaml")]
    Securities {
        /// Directory holding dated universe pulls
        #[arg(long, default_value = "data/raw/refdata")]
        input_dir: PathBuf,

        /// Exchange code used in raw filenames
        #[arg(long, default_value = "US")]
        exchange: String,

        /// Manifest output path
        #[arg(long, default_value = "manifests/securities/securities.yaml")]
        out: PathBuf,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Build the asset-catalog manifest, enriched from the registry manifest
    #[command(after_help = "\
Examples:
  canonid ingest catalog
  canonid ingest catalog --registry-manifest manifests/crypto/crypto.yaml
  canonid ingest catalog --asset-class cryptocurrency --out manifests/crypto/crypto.yaml")]
    Catalog {
        /// Directory holding dated catalog exports
        #[arg(long, default_value = "data/raw/catalog")]
        input_dir: PathBuf,

        /// Existing registry manifest used for alias enrichment
        #[arg(long)]
        registry_manifest: Option<PathBuf>,

        /// Identity schema for record validation
        #[arg(long, default_value = "schemas/identity.schema.json")]
        schema: PathBuf,

        /// Manifest output path
        #[arg(long, default_value = "manifests/crypto/crypto.yaml")]
        out: PathBuf,

        /// Keep only entries in this asset class
        #[arg(long, default_value = "cryptocurrency")]
        asset_class: String,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Clean the latest raw identifier-mapping pull
    #[command(after_help = "\
Examples:
  canonid ingest mapping
  canonid ingest mapping --input-dir data/raw/refdata --exchange US")]
    Mapping {
        /// Directory holding dated raw mapping pulls
        #[arg(long, default_value = "data/raw/refdata")]
        input_dir: PathBuf,

        /// Exchange code used in raw filenames
        #[arg(long, default_value = "US")]
        exchange: String,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },
}

pub fn cmd_ingest(command: IngestCommands) -> Result<(), CliError> {
    match command {
        IngestCommands::Registry { config, quiet } => registry::cmd_ingest_registry(config, quiet),
        IngestCommands::Securities {
            input_dir,
            exchange,
            out,
            quiet,
        } => securities::cmd_ingest_securities(input_dir, exchange, out, quiet),
        IngestCommands::Catalog {
            input_dir,
            registry_manifest,
            schema,
            out,
            asset_class,
            quiet,
        } => catalog::cmd_ingest_catalog(input_dir, registry_manifest, schema, out, asset_class, quiet),
        IngestCommands::Mapping {
            input_dir,
            exchange,
            quiet,
        } => mapping::cmd_ingest_mapping(input_dir, exchange, quiet),
    }
}
