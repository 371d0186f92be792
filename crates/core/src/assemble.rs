use std::collections::BTreeSet;

use crate::error::CoreError;
use crate::model::{ConsolidatedRecord, IdentityRecord};

/// Deterministic alias order for serialization: shortest first, then
/// lexicographic. Shorter codes are the more canonical-looking ones.
pub fn order_aliases(aliases: &BTreeSet<String>) -> Vec<String> {
    let mut ordered: Vec<String> = aliases.iter().cloned().collect();
    ordered.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    ordered
}

/// Turn overlap winners into the final manifest: join each record's own
/// aliases, then sort the collection case-insensitively by the joined
/// string. Two runs over the same input produce byte-identical output.
///
/// Every winner descends from a row that carried at least one alias, so an
/// empty alias set here means the upstream data is corrupt, which is fatal.
pub fn assemble_manifest(
    winners: Vec<ConsolidatedRecord>,
) -> Result<Vec<IdentityRecord>, CoreError> {
    let mut records = Vec::with_capacity(winners.len());
    for winner in winners {
        if winner.aliases.is_empty() {
            return Err(CoreError::EmptyAliasSet { isin: winner.isin });
        }
        records.push(IdentityRecord {
            isin: winner.isin,
            symbol: order_aliases(&winner.aliases).join(";"),
            name: winner.name,
            exchange: None,
        });
    }

    records.sort_by(|a, b| a.symbol.to_lowercase().cmp(&b.symbol.to_lowercase()));
    Ok(records)
}
