//! Batch Resolver - drives the matcher and aggregator over a whole roster.

use crate::aggregate::aggregate;
use crate::error::{IdentityError, Result};
use crate::matcher::{CatalogStatus, Matcher, ProviderCatalog};
use crate::stats::{BatchWarning, ResolutionStats, WarningKind};
use crate::types::{MatchResult, Provider, SourceRecord, UnifiedProfile};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Why a primary record has no counterpart in a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedReason {
    /// Every tier ran and none found a candidate
    NoCandidate,
    /// The provider's bulk database was empty or could not be indexed
    ProviderUnavailable,
    /// The primary record itself was unusable
    MalformedRecord,
}

/// A primary record that one provider could not resolve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedRecord {
    pub provider: Provider,
    pub reason: UnmatchedReason,
    pub record: SourceRecord,
}

/// Everything a resolution pass produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResolution {
    /// One profile per primary record, in input order
    pub profiles: Vec<UnifiedProfile>,
    pub unmatched: Vec<UnmatchedRecord>,
    pub stats: ResolutionStats,
}

/// Resolve every primary record against every target catalog, in input order.
///
/// Catalogs are read-only here; build them once per batch. Running this twice
/// over the same inputs gives the same profiles, unmatched list and counts.
pub fn resolve_batch(primary: &[SourceRecord], catalogs: &[ProviderCatalog<'_>]) -> Result<BatchResolution> {
    validate_catalogs(catalogs)?;

    let mut stats = ResolutionStats::start();
    info!("Resolving {} primary records against {} providers", primary.len(), catalogs.len());
    record_catalog_warnings(catalogs, &mut stats);

    let shard = resolve_shard(primary, 0, catalogs);
    stats.absorb(&shard.stats);
    stats.finish();

    log_summary(&stats);
    Ok(BatchResolution {
        profiles: shard.profiles.into_iter().map(|(_, p)| p).collect(),
        unmatched: shard.unmatched.into_iter().map(|(_, u)| u).collect(),
        stats,
    })
}

/// Same result as `resolve_batch`, with shards of `shard_size` records
/// resolved on the rayon pool. Each shard keeps its own counters, which are
/// summed after the join; output is put back in input order.
pub fn resolve_batch_sharded(
    primary: &[SourceRecord],
    catalogs: &[ProviderCatalog<'_>],
    shard_size: usize,
) -> Result<BatchResolution> {
    if shard_size == 0 {
        return Err(IdentityError::Config("shard size must be greater than zero".to_string()));
    }
    validate_catalogs(catalogs)?;

    let mut stats = ResolutionStats::start();
    info!(
        "Resolving {} primary records against {} providers in shards of {}",
        primary.len(),
        catalogs.len(),
        shard_size
    );
    record_catalog_warnings(catalogs, &mut stats);

    let shards: Vec<ShardOutput> = primary
        .par_chunks(shard_size)
        .enumerate()
        .map(|(n, chunk)| resolve_shard(chunk, n * shard_size, catalogs))
        .collect();

    let mut profiles = Vec::with_capacity(primary.len());
    let mut unmatched = Vec::new();
    for shard in shards {
        stats.absorb(&shard.stats);
        profiles.extend(shard.profiles);
        unmatched.extend(shard.unmatched);
    }
    profiles.sort_by_key(|(position, _)| *position);
    unmatched.sort_by_key(|(position, _)| *position);
    stats.finish();

    log_summary(&stats);
    Ok(BatchResolution {
        profiles: profiles.into_iter().map(|(_, p)| p).collect(),
        unmatched: unmatched.into_iter().map(|(_, u)| u).collect(),
        stats,
    })
}

struct ShardOutput {
    profiles: Vec<(usize, UnifiedProfile)>,
    unmatched: Vec<(usize, UnmatchedRecord)>,
    stats: ResolutionStats,
}

fn resolve_shard(records: &[SourceRecord], offset: usize, catalogs: &[ProviderCatalog<'_>]) -> ShardOutput {
    let mut output = ShardOutput {
        profiles: Vec::with_capacity(records.len()),
        unmatched: Vec::new(),
        stats: ResolutionStats::start(),
    };

    for (i, record) in records.iter().enumerate() {
        let position = offset + i;
        let targets = catalogs.iter().filter(|c| c.provider() != record.provider);

        let malformed = validate_record(record).err();
        if let Some(err) = &malformed {
            warn!("Skipping primary record #{}: {}", position, err);
            output.stats.record_error();
        }

        let mut results = BTreeMap::new();
        for catalog in targets {
            let result = if malformed.is_some() {
                MatchResult::miss()
            } else {
                Matcher::new(catalog).match_record(record)
            };

            if !result.matched {
                let reason = if malformed.is_some() {
                    UnmatchedReason::MalformedRecord
                } else if !catalog.is_ready() {
                    UnmatchedReason::ProviderUnavailable
                } else {
                    UnmatchedReason::NoCandidate
                };
                output.unmatched.push((
                    position,
                    UnmatchedRecord { provider: catalog.provider(), reason, record: record.clone() },
                ));
            }
            results.insert(catalog.provider(), result);
        }

        let profile = aggregate(record.clone(), results);
        output.stats.record_profile(&profile);
        output.profiles.push((position, profile));
    }

    output
}

fn validate_record(record: &SourceRecord) -> Result<()> {
    if record.normalized_name().is_empty() {
        return Err(IdentityError::malformed(
            record.provider,
            format!("record {:?} has no usable name", record.native_id),
        ));
    }
    Ok(())
}

fn validate_catalogs(catalogs: &[ProviderCatalog<'_>]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for catalog in catalogs {
        if !seen.insert(catalog.provider()) {
            return Err(IdentityError::Config(format!(
                "more than one catalog given for {}",
                catalog.provider()
            )));
        }
    }
    Ok(())
}

fn record_catalog_warnings(catalogs: &[ProviderCatalog<'_>], stats: &mut ResolutionStats) {
    for catalog in catalogs {
        let warning = match catalog.status() {
            CatalogStatus::Ready => continue,
            CatalogStatus::Empty => BatchWarning {
                provider: catalog.provider(),
                kind: WarningKind::MissingBulkDatabase,
                detail: IdentityError::MissingBulkDatabase { provider: catalog.provider() }.to_string(),
            },
            CatalogStatus::Unavailable(reason) => BatchWarning {
                provider: catalog.provider(),
                kind: WarningKind::IndexBuildFailure,
                detail: reason.clone(),
            },
        };
        warn!("{}: {}", catalog.provider(), warning.detail);
        stats.warn(warning);
    }
}

fn log_summary(stats: &ResolutionStats) {
    info!(
        "Resolved {} / {} players ({} unmatched, {} errors) in {}ms",
        stats.matched,
        stats.processed,
        stats.unmatched,
        stats.errors,
        stats.duration_ms.unwrap_or_default()
    );
    for (provider, provider_stats) in &stats.by_provider {
        debug!(
            "{}: {} matched, {} unmatched, strategies {:?}",
            provider, provider_stats.matched, provider_stats.unmatched, provider_stats.strategies
        );
    }
}
