use crate::types::{MatchResult, Provider, SourceRecord, UnifiedProfile};
use std::collections::BTreeMap;

/// Combine a primary record with its per-provider match results.
///
/// Every provider in `results` gets a slot; unmatched ones hold `None`.
/// Fields are never merged across providers.
pub fn aggregate(primary: SourceRecord, results: BTreeMap<Provider, MatchResult>) -> UnifiedProfile {
    let mut linked = BTreeMap::new();
    let mut match_provenance = BTreeMap::new();

    for (provider, result) in results {
        if provider == primary.provider {
            continue;
        }
        match_provenance.insert(provider, result.provenance());
        linked.insert(provider, if result.matched { result.target } else { None });
    }

    UnifiedProfile { primary, linked, match_provenance }
}
