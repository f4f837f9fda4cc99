use crate::types::{MatchStrategy, Provider, UnifiedProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per target provider counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub matched: u64,
    pub unmatched: u64,
    /// Hits per strategy tier
    pub strategies: BTreeMap<MatchStrategy, u64>,
}

impl ProviderStats {
    fn absorb(&mut self, other: &ProviderStats) {
        self.matched += other.matched;
        self.unmatched += other.unmatched;
        for (strategy, count) in &other.strategies {
            *self.strategies.entry(*strategy).or_default() += count;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingBulkDatabase,
    IndexBuildFailure,
}

/// A provider-wide problem, reported once per batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWarning {
    pub provider: Provider,
    pub kind: WarningKind,
    pub detail: String,
}

/// Counters for one resolution pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionStats {
    /// Primary records looked at
    pub processed: u64,

    /// Primary records resolved in every target provider
    pub matched: u64,

    /// Primary records missing in at least one target provider
    pub unmatched: u64,

    /// Primary records rejected as malformed
    pub errors: u64,

    pub by_provider: BTreeMap<Provider, ProviderStats>,

    pub warnings: Vec<BatchWarning>,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Wall-clock duration, set by `finish`
    pub duration_ms: Option<u64>,
}

impl Default for ResolutionStats {
    fn default() -> Self {
        Self::start()
    }
}

impl ResolutionStats {
    /// Fresh counters stamped with the current time
    pub fn start() -> Self {
        Self {
            processed: 0,
            matched: 0,
            unmatched: 0,
            errors: 0,
            by_provider: BTreeMap::new(),
            warnings: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            duration_ms: None,
        }
    }

    /// Count one aggregated profile
    pub fn record_profile(&mut self, profile: &UnifiedProfile) {
        self.processed += 1;
        if profile.is_fully_matched() {
            self.matched += 1;
        } else {
            self.unmatched += 1;
        }

        for (provider, provenance) in &profile.match_provenance {
            let entry = self.by_provider.entry(*provider).or_default();
            if provenance.matched {
                entry.matched += 1;
                *entry.strategies.entry(provenance.strategy).or_default() += 1;
            } else {
                entry.unmatched += 1;
            }
        }
    }

    /// Count a primary record that could not be matched at all
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn warn(&mut self, warning: BatchWarning) {
        self.warnings.push(warning);
    }

    /// Add a shard's counters into this one. Warnings are batch-level and are
    /// not taken from the shard.
    pub fn absorb(&mut self, other: &ResolutionStats) {
        self.processed += other.processed;
        self.matched += other.matched;
        self.unmatched += other.unmatched;
        self.errors += other.errors;
        for (provider, stats) in &other.by_provider {
            self.by_provider.entry(*provider).or_default().absorb(stats);
        }
    }

    /// Stamp the end time and duration
    pub fn finish(&mut self) {
        let now = Utc::now();
        let elapsed = (now - self.started_at).num_milliseconds().max(0) as u64;
        self.finished_at = Some(now);
        self.duration_ms = Some(elapsed);
    }

    /// Hits for one provider and strategy
    pub fn strategy_count(&self, provider: Provider, strategy: MatchStrategy) -> u64 {
        self.by_provider
            .get(&provider)
            .and_then(|s| s.strategies.get(&strategy))
            .copied()
            .unwrap_or(0)
    }

    /// Hits per strategy summed over providers
    pub fn strategy_totals(&self) -> BTreeMap<MatchStrategy, u64> {
        let mut totals = BTreeMap::new();
        for stats in self.by_provider.values() {
            for (strategy, count) in &stats.strategies {
                *totals.entry(*strategy).or_default() += count;
            }
        }
        totals
    }

    /// Equality ignoring timestamps
    pub fn same_counts(&self, other: &ResolutionStats) -> bool {
        self.processed == other.processed
            && self.matched == other.matched
            && self.unmatched == other.unmatched
            && self.errors == other.errors
            && self.by_provider == other.by_provider
            && self.warnings == other.warnings
    }
}
