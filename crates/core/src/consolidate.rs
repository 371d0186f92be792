use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreError;
use crate::model::{ConsolidatedRecord, RegistryRow};
use crate::rank::{group_rank_key, normalize_alias};

// ---------------------------------------------------------------------------
// Stage 2: identifier-level consolidation
// ---------------------------------------------------------------------------

/// Collapse one authoritative-identifier group into a single record.
///
/// The winner contributes the display name and ranking attributes; the
/// alias set is the union over every row in the group, including the
/// FISN-derived code where present.
pub fn consolidate_identifier_group(
    isin: &str,
    rows: &[RegistryRow],
) -> Result<ConsolidatedRecord, CoreError> {
    let winner = rows
        .iter()
        .min_by_key(|r| group_rank_key(r.status.priority(), r.link_count, r.seniority()))
        .ok_or_else(|| CoreError::EmptyGroup(isin.to_string()))?;

    let mut aliases = BTreeSet::new();
    for row in rows {
        for segment in row.aliases.split(';') {
            if let Some(alias) = normalize_alias(segment) {
                aliases.insert(alias);
            }
        }
        if let Some(derived) = &row.derived_alias {
            if let Some(alias) = normalize_alias(derived) {
                aliases.insert(alias);
            }
        }
    }

    Ok(ConsolidatedRecord {
        isin: isin.to_string(),
        aliases,
        name: winner.name.trim().to_string(),
        status_priority: winner.status.priority(),
        link_count: winner.link_count,
        added_date: winner.seniority(),
    })
}

// ---------------------------------------------------------------------------
// Stage 3: name-level consolidation
// ---------------------------------------------------------------------------

/// Re-group identifier-level records by (primary alias, lowercased name)
/// and collapse each re-group with the same ranking as stage 2.
///
/// Matching on the combination prevents accidental merges across genuinely
/// different instruments that share only a name or only an alias; records
/// that agree on both are near-duplicate registry entries for one
/// instrument.
pub fn consolidate_by_name(
    records: Vec<ConsolidatedRecord>,
) -> Result<Vec<ConsolidatedRecord>, CoreError> {
    let mut groups: BTreeMap<(String, String), Vec<ConsolidatedRecord>> = BTreeMap::new();
    for record in records {
        let primary = record.aliases.iter().next().cloned().unwrap_or_default();
        let key = (primary, record.name.to_lowercase());
        groups.entry(key).or_default().push(record);
    }

    let mut merged = Vec::with_capacity(groups.len());
    for ((primary, _), group) in groups {
        merged.push(merge_name_group(&primary, group)?);
    }
    Ok(merged)
}

fn merge_name_group(
    key: &str,
    group: Vec<ConsolidatedRecord>,
) -> Result<ConsolidatedRecord, CoreError> {
    let winner_idx = group
        .iter()
        .enumerate()
        .min_by_key(|(_, r)| group_rank_key(r.status_priority, r.link_count, r.added_date))
        .map(|(i, _)| i)
        .ok_or_else(|| CoreError::EmptyGroup(key.to_string()))?;

    let mut aliases = BTreeSet::new();
    for record in &group {
        aliases.extend(record.aliases.iter().cloned());
    }

    let winner = &group[winner_idx];
    Ok(ConsolidatedRecord {
        isin: winner.isin.clone(),
        aliases,
        name: winner.name.clone(),
        status_priority: winner.status_priority,
        link_count: winner.link_count,
        added_date: winner.added_date,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(status: Status, aliases: &str, name: &str) -> RegistryRow {
        RegistryRow {
            isin: "XX0000000001".into(),
            record_type: "Referential Instrument".into(),
            category: "TMXXXX".into(),
            status,
            aliases: aliases.into(),
            derived_alias: None,
            name: name.into(),
            added_date: Some(date("2022-06-01")),
            link_count: 0,
        }
    }

    fn record(isin: &str, aliases: &[&str], name: &str) -> ConsolidatedRecord {
        ConsolidatedRecord {
            isin: isin.into(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            name: name.into(),
            status_priority: 2,
            link_count: 0,
            added_date: date("2022-06-01"),
        }
    }

    #[test]
    fn validated_row_wins_regardless_of_order() {
        let provisional = row(Status::Provisional, "XBT", "BITCOIN CORE");
        let validated = row(Status::Validated, "BTC", "Bitcoin");

        for group in [
            vec![provisional.clone(), validated.clone()],
            vec![validated.clone(), provisional.clone()],
        ] {
            let merged = consolidate_identifier_group("XX0000000001", &group).unwrap();
            assert_eq!(merged.name, "Bitcoin");
            assert_eq!(merged.status_priority, 1);
        }
    }

    #[test]
    fn aliases_union_over_all_rows() {
        let mut a = row(Status::Validated, "BTC; btc ;", "Bitcoin");
        a.derived_alias = Some("xbt".into());
        let b = row(Status::Provisional, "BITCOIN", "Bitcoin");

        let merged = consolidate_identifier_group("XX0000000001", &[a, b]).unwrap();
        let aliases: Vec<&str> = merged.aliases.iter().map(String::as_str).collect();
        assert_eq!(aliases, vec!["BITCOIN", "BTC", "XBT"]);
    }

    #[test]
    fn link_count_breaks_status_tie() {
        let mut low = row(Status::Provisional, "A", "low");
        low.link_count = 1;
        let mut high = row(Status::Provisional, "B", "high");
        high.link_count = 3;

        let merged = consolidate_identifier_group("XX0000000001", &[low, high]).unwrap();
        assert_eq!(merged.name, "high");
    }

    #[test]
    fn earlier_date_breaks_remaining_tie() {
        let mut late = row(Status::Provisional, "A", "late");
        late.added_date = Some(date("2023-01-01"));
        let mut early = row(Status::Provisional, "B", "early");
        early.added_date = Some(date("2020-01-01"));
        let mut missing = row(Status::Provisional, "C", "missing");
        missing.added_date = None;

        let merged =
            consolidate_identifier_group("XX0000000001", &[late, early, missing]).unwrap();
        assert_eq!(merged.name, "early");
    }

    #[test]
    fn empty_group_is_contract_violation() {
        let err = consolidate_identifier_group("XX0000000001", &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyGroup(_)));
    }

    #[test]
    fn name_stage_merges_same_primary_alias_and_name() {
        // Same instrument under two registry identifiers, names differing
        // only by case.
        let a = record("XX0000000001", &["BTC", "XBT"], "Bitcoin");
        let b = record("XX0000000002", &["BTC"], "BITCOIN");

        let merged = consolidate_by_name(vec![a, b]).unwrap();
        assert_eq!(merged.len(), 1);
        let aliases: Vec<&str> = merged[0].aliases.iter().map(String::as_str).collect();
        assert_eq!(aliases, vec!["BTC", "XBT"]);
    }

    #[test]
    fn name_stage_keeps_distinct_instruments_apart() {
        // Shared name, different primary alias: not the same instrument.
        let a = record("XX0000000001", &["ABC"], "Acme Token");
        let b = record("XX0000000002", &["XYZ"], "Acme Token");

        let merged = consolidate_by_name(vec![a, b]).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn name_stage_winner_supplies_identifier() {
        let mut a = record("XX0000000001", &["BTC"], "Bitcoin");
        a.status_priority = 2;
        let mut b = record("XX0000000002", &["BTC"], "bitcoin");
        b.status_priority = 1;

        let merged = consolidate_by_name(vec![a, b]).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].isin, "XX0000000002");
    }
}
