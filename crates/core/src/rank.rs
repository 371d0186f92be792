//! The two ranking orders used by consolidation.
//!
//! The identifier/name stages and the overlap stage rank by different
//! criteria on purpose: keep them as two separate functions, a shared one
//! would silently change which entries count as authoritative at each
//! resolution granularity.

use std::cmp::Reverse;

use chrono::NaiveDate;

/// Ranking key for identifier- and name-level consolidation: best status
/// first, then most cross-reference links, then earliest addition. Lower
/// keys win; ties fall back to the caller's input order.
pub fn group_rank_key(
    status_priority: u8,
    link_count: u32,
    added_date: NaiveDate,
) -> (u8, Reverse<u32>, NaiveDate) {
    (status_priority, Reverse(link_count), added_date)
}

/// Ranking key for overlap-component resolution: an entry with more than
/// one cross-reference link beats everything, then earliest addition, then
/// status. Status is deliberately the weakest signal here: by this stage
/// it has already filtered out low-quality entries.
pub fn component_rank_key(
    link_count: u32,
    added_date: NaiveDate,
    status_priority: u8,
) -> (Reverse<bool>, NaiveDate, u8) {
    (Reverse(link_count > 1), added_date, status_priority)
}

/// Trim and uppercase one alias code. Returns `None` for empty input.
pub fn normalize_alias(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}
