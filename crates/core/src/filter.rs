use std::collections::BTreeMap;

use crate::config::EligibilityConfig;
use crate::model::RegistryRow;

/// Keep eligible rows and group them by authoritative identifier.
///
/// A row survives only if its type and category match the configured tags,
/// its status is not excluded, and its identifier is non-empty after
/// trimming. Everything else is expected noise in the feed and dropped
/// silently. BTreeMap keeps group iteration deterministic.
pub fn group_eligible_rows(
    eligibility: &EligibilityConfig,
    rows: Vec<RegistryRow>,
) -> BTreeMap<String, Vec<RegistryRow>> {
    let mut groups: BTreeMap<String, Vec<RegistryRow>> = BTreeMap::new();

    for row in rows {
        if row.record_type != eligibility.record_type {
            continue;
        }
        if row.category != eligibility.category {
            continue;
        }
        if eligibility.excluded_statuses.contains(&row.status) {
            continue;
        }
        let isin = row.isin.trim();
        if isin.is_empty() {
            continue;
        }
        groups.entry(isin.to_string()).or_default().push(row);
    }

    groups
}
