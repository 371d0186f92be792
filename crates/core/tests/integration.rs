use std::collections::HashSet;
use std::path::PathBuf;

use proptest::prelude::*;

use canonid_core::config::ManifestConfig;
use canonid_core::engine::{load_registry_rows, run};
use canonid_core::model::{RegistryRow, Status};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_fixture() -> (ManifestConfig, Vec<RegistryRow>) {
    let config_toml =
        std::fs::read_to_string(fixtures_dir().join("manifest.toml")).unwrap();
    let config = ManifestConfig::from_toml(&config_toml).unwrap();

    let csv_path = fixtures_dir().join("instrument-list-20250601.csv");
    let csv_data = std::fs::read_to_string(&csv_path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", csv_path.display()));
    let rows = load_registry_rows(&csv_data, &config.source).unwrap();
    (config, rows)
}

// -------------------------------------------------------------------------
// End-to-end fixture run
// -------------------------------------------------------------------------

#[test]
fn fixture_pipeline_counts() {
    let (config, rows) = load_fixture();
    let result = run(&config, rows).unwrap();

    // 9 input rows; Reserved, wrong category, wrong type, and blank-ISIN
    // rows drop at the filter. The two Bitcoin identifiers collapse via
    // shared XBT.
    assert_eq!(result.summary.input_rows, 9);
    assert_eq!(result.summary.eligible_rows, 5);
    assert_eq!(result.summary.identifier_groups, 4);
    assert_eq!(result.summary.name_groups, 4);
    assert_eq!(result.summary.components, 3);
    assert_eq!(result.summary.records, 3);
}

#[test]
fn fixture_pipeline_records() {
    let (config, rows) = load_fixture();
    let result = run(&config, rows).unwrap();

    let symbols: Vec<&str> = result.records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["ADA", "BTC;XBT", "ETH"]);

    // The Bitcoin component resolves to the multi-link identifier, and
    // keeps only that winner's aliases; BITCOIN from the loser is gone.
    let btc = &result.records[1];
    assert_eq!(btc.isin, "XX0000000001");
    assert_eq!(btc.name, "Bitcoin");
    assert_eq!(btc.exchange, None);
}

#[test]
fn fixture_pipeline_is_deterministic() {
    let (config, rows) = load_fixture();
    let first = run(&config, rows.clone()).unwrap();
    let second = run(&config, rows).unwrap();
    assert_eq!(first.records, second.records);
}

#[test]
fn validated_wins_regardless_of_input_order() {
    let (config, mut rows) = load_fixture();
    rows.reverse();
    let result = run(&config, rows).unwrap();

    let btc = result
        .records
        .iter()
        .find(|r| r.symbol.contains("BTC"))
        .unwrap();
    assert_eq!(btc.name, "Bitcoin");
}

// -------------------------------------------------------------------------
// Property: output alias sets are pairwise disjoint, and every output
// alias came from the input
// -------------------------------------------------------------------------

fn test_config() -> ManifestConfig {
    let config_toml =
        std::fs::read_to_string(fixtures_dir().join("manifest.toml")).unwrap();
    ManifestConfig::from_toml(&config_toml).unwrap()
}

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Validated),
        Just(Status::Provisional),
        Just(Status::Private),
        Just(Status::Reserved),
    ]
}

fn arb_row() -> impl Strategy<Value = RegistryRow> {
    let alias_pool = prop::sample::subsequence(
        vec!["BTC", "XBT", "ETH", "ETHER", "SOL", "ADA", "DOT", "XRP"],
        1..4,
    );
    (
        0u8..6,
        arb_status(),
        alias_pool,
        prop::option::of(0u32..1000),
        0u32..4,
    )
        .prop_map(|(id, status, aliases, day_offset, link_count)| RegistryRow {
            isin: format!("XX000000000{id}"),
            record_type: "Referential Instrument".into(),
            category: "TMXXXX".into(),
            status,
            aliases: aliases.join(";"),
            derived_alias: None,
            name: format!("Asset {id}"),
            added_date: day_offset.and_then(|d| {
                chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(u64::from(d)))
            }),
            link_count,
        })
}

proptest! {
    #[test]
    fn alias_sets_stay_disjoint(rows in prop::collection::vec(arb_row(), 0..40)) {
        let config = test_config();
        let input_aliases: HashSet<String> = rows
            .iter()
            .flat_map(|r| r.aliases.split(';'))
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        let result = run(&config, rows).unwrap();

        let mut seen: HashSet<String> = HashSet::new();
        for record in &result.records {
            for alias in record.aliases() {
                prop_assert!(
                    seen.insert(alias.to_string()),
                    "alias {alias} appears in two records",
                );
                prop_assert!(input_aliases.contains(alias));
            }
        }
    }

    #[test]
    fn pipeline_is_idempotent(rows in prop::collection::vec(arb_row(), 0..40)) {
        let config = test_config();
        let first = run(&config, rows.clone()).unwrap();
        let second = run(&config, rows).unwrap();
        prop_assert_eq!(first.records, second.records);
    }
}
