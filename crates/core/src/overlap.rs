use std::collections::{HashMap, VecDeque};

use crate::model::ConsolidatedRecord;
use crate::rank::component_rank_key;

/// Resolve residual duplicates that share any alias under different
/// authoritative identifiers.
///
/// Records are nodes; two nodes are adjacent iff their alias sets
/// intersect. Each connected component collapses to its highest-ranked
/// member. Losing members are dropped entirely, aliases included: the
/// overlap signal suppresses duplicates, it never accumulates their
/// vocabulary.
pub fn resolve_overlaps(records: Vec<ConsolidatedRecord>) -> Vec<ConsolidatedRecord> {
    let adjacency = build_adjacency(&records);

    let mut visited = vec![false; records.len()];
    let mut winners = Vec::new();

    for start in 0..records.len() {
        if visited[start] {
            continue;
        }
        let component = collect_component(start, &adjacency, &mut visited);

        // Component indices are in input order, so ranking ties fall back
        // to first-seen, same as the earlier stages.
        let winner = component
            .iter()
            .copied()
            .min_by_key(|&i| {
                let r = &records[i];
                component_rank_key(r.link_count, r.added_date, r.status_priority)
            })
            .expect("component always contains its start node");

        winners.push(records[winner].clone());
    }

    winners
}

/// Adjacency lists via an alias-keyed index. Cost stays near-linear in the
/// number of (record, alias) pairs instead of quadratic in records.
fn build_adjacency(records: &[ConsolidatedRecord]) -> Vec<Vec<usize>> {
    let mut by_alias: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        for alias in &record.aliases {
            by_alias.entry(alias.as_str()).or_default().push(i);
        }
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    for nodes in by_alias.values() {
        for (k, &a) in nodes.iter().enumerate() {
            for &b in &nodes[k + 1..] {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }
    }
    for neighbors in &mut adjacency {
        neighbors.sort_unstable();
        neighbors.dedup();
    }
    adjacency
}

/// BFS from `start`; returns the component's node indices sorted ascending.
fn collect_component(
    start: usize,
    adjacency: &[Vec<usize>],
    visited: &mut [bool],
) -> Vec<usize> {
    let mut component = Vec::new();
    let mut queue = VecDeque::from([start]);
    visited[start] = true;

    while let Some(current) = queue.pop_front() {
        component.push(current);
        for &neighbor in &adjacency[current] {
            if !visited[neighbor] {
                visited[neighbor] = true;
                queue.push_back(neighbor);
            }
        }
    }

    component.sort_unstable();
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(isin: &str, aliases: &[&str]) -> ConsolidatedRecord {
        ConsolidatedRecord {
            isin: isin.into(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            name: isin.to_lowercase(),
            status_priority: 2,
            link_count: 0,
            added_date: date("2022-06-01"),
        }
    }

    #[test]
    fn disjoint_records_all_survive() {
        let records = vec![
            record("XX0000000001", &["BTC"]),
            record("XX0000000002", &["ETH"]),
            record("XX0000000003", &["SOL"]),
        ];
        let winners = resolve_overlaps(records);
        assert_eq!(winners.len(), 3);
    }

    #[test]
    fn shared_alias_collapses_to_one_winner() {
        let mut a = record("XX0000000001", &["BTC", "XBT"]);
        a.added_date = date("2020-01-01");
        let b = record("XX0000000002", &["XBT", "BITCOIN"]);

        let winners = resolve_overlaps(vec![a, b]);
        assert_eq!(winners.len(), 1);
        // Earlier addition wins; only the winner's own aliases remain.
        assert_eq!(winners[0].isin, "XX0000000001");
        let aliases: Vec<&str> = winners[0].aliases.iter().map(String::as_str).collect();
        assert_eq!(aliases, vec!["BTC", "XBT"]);
    }

    #[test]
    fn transitive_overlap_forms_one_component() {
        // A-B share X, B-C share Y: all three are one component even though
        // A and C share nothing directly.
        let mut a = record("XX0000000001", &["A1", "X"]);
        a.added_date = date("2019-01-01");
        let b = record("XX0000000002", &["X", "Y"]);
        let c = record("XX0000000003", &["Y", "C1"]);

        let winners = resolve_overlaps(vec![a, b, c]);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].isin, "XX0000000001");
    }

    #[test]
    fn multi_link_beats_status_and_seniority() {
        let mut senior = record("XX0000000001", &["BTC"]);
        senior.status_priority = 1;
        senior.added_date = date("2018-01-01");
        senior.link_count = 1;

        let mut linked = record("XX0000000002", &["BTC"]);
        linked.status_priority = 2;
        linked.added_date = date("2024-01-01");
        linked.link_count = 2;

        let mut other = record("XX0000000003", &["BTC"]);
        other.link_count = 0;

        let winners = resolve_overlaps(vec![senior, linked, other]);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].isin, "XX0000000002");
    }

    #[test]
    fn output_alias_sets_are_disjoint() {
        let records = vec![
            record("XX0000000001", &["BTC", "XBT"]),
            record("XX0000000002", &["XBT", "BITCOIN"]),
            record("XX0000000003", &["ETH"]),
            record("XX0000000004", &["ETH", "ETHER"]),
            record("XX0000000005", &["SOL"]),
        ];
        let winners = resolve_overlaps(records);
        assert_eq!(winners.len(), 3);
        for (i, a) in winners.iter().enumerate() {
            for b in &winners[i + 1..] {
                assert!(a.aliases.is_disjoint(&b.aliases));
            }
        }
    }
}
