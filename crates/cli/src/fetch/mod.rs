//! `canonid fetch` — pull raw reference data into dated JSON files.

pub(crate) mod common;
mod refdata;

use std::path::PathBuf;

use clap::Subcommand;

use crate::CliError;

#[derive(Subcommand)]
pub enum FetchCommands {
    /// Fetch the identifier-mapping table (paginated)
    #[command(after_help = "\
Examples:
  canonid fetch mapping --base-url https://api.example.com/v1
  canonid fetch mapping --exchange US --out-dir data/raw/refdata
  REFDATA_API_TOKEN=... canonid fetch mapping")]
    Mapping {
        /// Provider API base URL
        #[arg(long, env = "REFDATA_API_BASE")]
        base_url: String,

        /// Provider API token (default: REFDATA_API_TOKEN env)
        #[arg(long)]
        api_token: Option<String>,

        /// Exchange filter
        #[arg(long, default_value = "US")]
        exchange: String,

        /// Directory for dated raw output files
        #[arg(long, default_value = "data/raw/refdata")]
        out_dir: PathBuf,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Fetch the full instrument universe for one exchange
    #[command(after_help = "\
Examples:
  canonid fetch universe --base-url https://api.example.com/v1
  canonid fetch universe --exchange US --out-dir data/raw/refdata
  REFDATA_API_TOKEN=... canonid fetch universe")]
    Universe {
        /// Provider API base URL
        #[arg(long, env = "REFDATA_API_BASE")]
        base_url: String,

        /// Provider API token (default: REFDATA_API_TOKEN env)
        #[arg(long)]
        api_token: Option<String>,

        /// Exchange code
        #[arg(long, default_value = "US")]
        exchange: String,

        /// Directory for dated raw output files
        #[arg(long, default_value = "data/raw/refdata")]
        out_dir: PathBuf,

        /// Suppress progress on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },
}

pub fn cmd_fetch(command: FetchCommands) -> Result<(), CliError> {
    match command {
        FetchCommands::Mapping {
            base_url,
            api_token,
            exchange,
            out_dir,
            quiet,
        } => refdata::cmd_fetch_mapping(base_url, api_token, exchange, out_dir, quiet),
        FetchCommands::Universe {
            base_url,
            api_token,
            exchange,
            out_dir,
            quiet,
        } => refdata::cmd_fetch_universe(base_url, api_token, exchange, out_dir, quiet),
    }
}
