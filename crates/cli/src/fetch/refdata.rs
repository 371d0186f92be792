//! `canonid fetch mapping` / `canonid fetch universe` — pull raw reference
//! data from the provider into dated JSON files.

use std::path::PathBuf;

use serde_json::Value;

use crate::exit_codes;
use crate::CliError;

use super::common::{self, FetchClient};

// ── Refdata client ──────────────────────────────────────────────────

pub struct RefdataClient {
    client: FetchClient,
    api_token: String,
    base_url: String,
}

impl RefdataClient {
    pub fn new(api_token: String, base_url: String) -> Self {
        Self {
            client: FetchClient::new("refdata", extract_refdata_error),
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch every page of the identifier-mapping table, following
    /// `links.next` until the provider stops supplying one.
    fn fetch_mapping(&self, exchange: &str, quiet: bool) -> Result<Vec<Value>, CliError> {
        let mut all_records = Vec::new();
        let mut page = 0u32;
        let stderr_tty = atty::is(atty::Stream::Stderr);
        let show_progress = !quiet && stderr_tty;

        let mut url = format!("{}/id-mapping", self.base_url);
        let mut first_page = true;

        loop {
            page += 1;
            let request_url = url.clone();
            let api_token = self.api_token.clone();
            let exchange = exchange.to_string();
            let with_filters = first_page;

            let body = self.client.request_with_retry(|http| {
                let mut req = http
                    .get(&request_url)
                    .query(&[("api_token", api_token.as_str())]);
                if with_filters {
                    req = req.query(&[
                        ("filter[ex]", exchange.as_str()),
                        ("fmt", "json"),
                    ]);
                }
                req
            })?;

            let records = body["data"].as_array().ok_or_else(|| CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: "refdata response missing 'data' array".into(),
                hint: None,
            })?;

            if show_progress {
                eprintln!(
                    "  page {}: {} records (total: {})",
                    page,
                    records.len(),
                    all_records.len() + records.len(),
                );
            }
            all_records.extend(records.iter().cloned());

            // Pagination guard: a next link pointing back at the page we
            // just fetched would loop forever.
            match body["links"]["next"].as_str() {
                Some(next) if !next.is_empty() => {
                    if next == request_url {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: "refdata pagination stuck: same page linked twice".into(),
                            hint: None,
                        });
                    }
                    url = next.to_string();
                    first_page = false;
                }
                _ => break,
            }
        }

        Ok(all_records)
    }

    /// One-shot pull of the full instrument list for an exchange.
    fn fetch_universe(&self, exchange: &str) -> Result<Vec<Value>, CliError> {
        let url = format!("{}/exchange-symbol-list/{}", self.base_url, exchange);
        let api_token = self.api_token.clone();

        let body = self.client.request_with_retry(|http| {
            http.get(&url)
                .query(&[("api_token", api_token.as_str()), ("fmt", "json")])
        })?;

        match body {
            Value::Array(records) => Ok(records),
            _ => Err(CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: "refdata universe response is not a JSON array".into(),
                hint: None,
            }),
        }
    }
}

fn extract_refdata_error(body: &Value, status: u16) -> String {
    body["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .unwrap_or(&format!("HTTP {}", status))
        .to_string()
}

// ── Entry points ────────────────────────────────────────────────────

pub fn cmd_fetch_mapping(
    base_url: String,
    api_token: Option<String>,
    exchange: String,
    out_dir: PathBuf,
    quiet: bool,
) -> Result<(), CliError> {
    let token = resolve_api_token(api_token)?;
    let client = RefdataClient::new(token, base_url);

    let stderr_tty = atty::is(atty::Stream::Stderr);
    let show_progress = !quiet && stderr_tty;
    if show_progress {
        eprintln!("Fetching identifier mappings ({exchange})...");
    }

    let records = client.fetch_mapping(&exchange, quiet)?;

    let prefix = format!("id_mapping_{}_raw", exchange.to_lowercase());
    let out_path = common::dated_output_path(&out_dir, &prefix);
    canonid_io::json::write_records(&out_path, &records).map_err(CliError::io)?;

    if show_progress {
        eprintln!("Done: {} records written to {}", records.len(), out_path.display());
    }

    Ok(())
}

pub fn cmd_fetch_universe(
    base_url: String,
    api_token: Option<String>,
    exchange: String,
    out_dir: PathBuf,
    quiet: bool,
) -> Result<(), CliError> {
    let token = resolve_api_token(api_token)?;
    let client = RefdataClient::new(token, base_url);

    let stderr_tty = atty::is(atty::Stream::Stderr);
    let show_progress = !quiet && stderr_tty;
    if show_progress {
        eprintln!("Fetching instrument universe ({exchange})...");
    }

    let records = client.fetch_universe(&exchange)?;

    let prefix = format!("universe_{}", exchange.to_lowercase());
    let out_path = common::dated_output_path(&out_dir, &prefix);
    canonid_io::json::write_records(&out_path, &records).map_err(CliError::io)?;

    if show_progress {
        eprintln!("Done: {} records written to {}", records.len(), out_path.display());
    }

    Ok(())
}

fn resolve_api_token(flag: Option<String>) -> Result<String, CliError> {
    common::resolve_api_token(flag, "refdata", "REFDATA_API_TOKEN")
}

// ── Tests ───────────────────────────────────────────────────────────
