//! Matching chain - finds a source player's record in another provider.
//!
//! Tiers run strictest first and the chain stops at the first hit:
//!
//! 1. direct foreign-id lookup through the cross-reference index
//! 2. team-defense lookup by team (the only tier for defense units)
//! 3. exact normalized name + team
//! 4. last name + (team or position)
//! 5. the provider's own name search
//!
//! A tier that fails is logged and treated as "no match" for that tier only.

use crate::error::{IdentityError, Result};
use crate::index::CrossReferenceIndex;
use crate::normalize::team_equal;
use crate::types::{MatchResult, MatchStrategy, Provider, SourceRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

const PERSON_TIERS: [MatchStrategy; 4] = [
    MatchStrategy::DirectId,
    MatchStrategy::ExactNameTeam,
    MatchStrategy::LastNameTeamOrPosition,
    MatchStrategy::ProviderSearch,
];

const DEFENSE_TIERS: [MatchStrategy; 1] = [MatchStrategy::TeamDefense];

/// A provider's own name lookup, used as the last resort
pub trait NameSearch: Send + Sync {
    /// Best single candidate for `name` (optionally on `team`), if any
    fn search_by_name(&self, name: &str, team: Option<&str>) -> Result<Option<SourceRecord>>;
}

/// Whether a provider can be matched against in this batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum CatalogStatus {
    Ready,
    /// Bulk database came back empty
    Empty,
    /// Bulk database could not be read or indexed
    Unavailable(String),
}

/// Everything known about one target provider for the length of a batch:
/// its bulk database, the index built over it, and its search fallback.
pub struct ProviderCatalog<'a> {
    provider: Provider,
    records: &'a [SourceRecord],
    index: Option<CrossReferenceIndex<'a>>,
    search: Option<&'a dyn NameSearch>,
    status: CatalogStatus,
}

impl<'a> ProviderCatalog<'a> {
    /// Build the catalog and its index over `foreign_id_field`, once.
    ///
    /// Pass `None` for the field when the target embeds no id of the source.
    pub fn new(provider: Provider, records: &'a [SourceRecord], foreign_id_field: Option<&str>) -> Self {
        if records.is_empty() {
            warn!("{} bulk database is empty, matches against it will fail", provider);
            return Self { provider, records, index: None, search: None, status: CatalogStatus::Empty };
        }

        let index = foreign_id_field.map(|field| CrossReferenceIndex::build(records, field));
        if let Some(index) = &index {
            debug!("Indexed {} of {} {} records by '{}'", index.len(), records.len(), provider, index.field());
        }

        Self { provider, records, index, search: None, status: CatalogStatus::Ready }
    }

    /// Catalog for a provider whose bulk database could not be built
    pub fn unavailable(provider: Provider, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!("{} catalog unavailable: {}", provider, reason);
        Self {
            provider,
            records: &[],
            index: None,
            search: None,
            status: CatalogStatus::Unavailable(reason),
        }
    }

    /// Build from an adapter outcome; adapter errors mark the catalog unavailable
    pub fn from_result(
        provider: Provider,
        records: &'a std::result::Result<Vec<SourceRecord>, IdentityError>,
        foreign_id_field: Option<&str>,
    ) -> Self {
        match records {
            Ok(records) => Self::new(provider, records, foreign_id_field),
            Err(err) => Self::unavailable(provider, err.to_string()),
        }
    }

    /// Attach the provider's search fallback
    pub fn with_search(mut self, search: &'a dyn NameSearch) -> Self {
        self.search = Some(search);
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn records(&self) -> &'a [SourceRecord] {
        self.records
    }

    pub fn index(&self) -> Option<&CrossReferenceIndex<'a>> {
        self.index.as_ref()
    }

    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == CatalogStatus::Ready
    }
}

impl fmt::Debug for ProviderCatalog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCatalog")
            .field("provider", &self.provider)
            .field("records", &self.records.len())
            .field("index", &self.index.as_ref().map(|i| i.len()))
            .field("search", &self.search.is_some())
            .field("status", &self.status)
            .finish()
    }
}

/// Result of one match plus the tiers that were tried, in order
#[derive(Debug, Clone, PartialEq)]
pub struct MatchTrace {
    pub result: MatchResult,
    pub attempted: Vec<MatchStrategy>,
}

/// Runs the tier chain against one target catalog
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'c, 'a> {
    catalog: &'c ProviderCatalog<'a>,
}

impl<'c, 'a> Matcher<'c, 'a> {
    pub fn new(catalog: &'c ProviderCatalog<'a>) -> Self {
        Self { catalog }
    }

    pub fn target(&self) -> Provider {
        self.catalog.provider
    }

    /// Find `source` in the target provider
    pub fn match_record(&self, source: &SourceRecord) -> MatchResult {
        self.match_traced(source).result
    }

    /// Like `match_record`, also reporting which tiers ran
    pub fn match_traced(&self, source: &SourceRecord) -> MatchTrace {
        let mut attempted = Vec::new();

        if !self.catalog.is_ready() {
            return MatchTrace { result: MatchResult::miss(), attempted };
        }

        let tiers: &[MatchStrategy] =
            if source.is_team_defense() { &DEFENSE_TIERS } else { &PERSON_TIERS };

        for &strategy in tiers {
            attempted.push(strategy);
            match self.run_tier(strategy, source) {
                Ok(Some(target)) => {
                    debug!(
                        "Matched {} '{}' to {} '{}' via {}",
                        source.provider,
                        source.display_name,
                        self.catalog.provider,
                        target.display_name,
                        strategy
                    );
                    return MatchTrace { result: MatchResult::hit(strategy, target), attempted };
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        "{} tier {} failed for '{}': {}",
                        self.catalog.provider, strategy, source.display_name, err
                    );
                }
            }
        }

        debug!("No {} match for '{}'", self.catalog.provider, source.display_name);
        MatchTrace { result: MatchResult::miss(), attempted }
    }

    fn run_tier(&self, strategy: MatchStrategy, source: &SourceRecord) -> Result<Option<SourceRecord>> {
        match strategy {
            MatchStrategy::DirectId => Ok(self.direct_id(source).cloned()),
            MatchStrategy::TeamDefense => Ok(self.team_defense(source).cloned()),
            MatchStrategy::ExactNameTeam => self.exact_name_team(source).map(|r| r.cloned()),
            MatchStrategy::LastNameTeamOrPosition => {
                self.last_name_team_or_position(source).map(|r| r.cloned())
            }
            MatchStrategy::ProviderSearch => self.provider_search(source),
            MatchStrategy::None => Ok(None),
        }
    }

    fn direct_id(&self, source: &SourceRecord) -> Option<&'a SourceRecord> {
        let id = source.native_id.as_deref()?;
        self.catalog.index.as_ref()?.lookup(id)
    }

    fn team_defense(&self, source: &SourceRecord) -> Option<&'a SourceRecord> {
        // Without a team every defense would qualify
        let team = source.team_code.as_deref().filter(|t| !t.trim().is_empty())?;
        self.catalog.records.iter().find(|candidate| {
            is_defense_entry(candidate)
                && candidate.team_code.is_some()
                && team_equal(Some(team), candidate.team_code.as_deref())
        })
    }

    fn exact_name_team(&self, source: &SourceRecord) -> Result<Option<&'a SourceRecord>> {
        let name = source.normalized_name();
        if name.is_empty() {
            return Err(no_comparable_name(MatchStrategy::ExactNameTeam, source));
        }
        Ok(self.catalog.records.iter().find(|candidate| {
            !is_defense_entry(candidate)
                && candidate.normalized_name() == name
                && team_equal(source.team_code.as_deref(), candidate.team_code.as_deref())
        }))
    }

    fn last_name_team_or_position(&self, source: &SourceRecord) -> Result<Option<&'a SourceRecord>> {
        let name = source.normalized_name();
        let last = name
            .last_token()
            .ok_or_else(|| no_comparable_name(MatchStrategy::LastNameTeamOrPosition, source))?;
        let position = source.primary_position();

        Ok(self.catalog.records.iter().find(|candidate| {
            if is_defense_entry(candidate) || !candidate.normalized_name().ends_with_token(last) {
                return false;
            }
            team_equal(source.team_code.as_deref(), candidate.team_code.as_deref())
                || (position.is_some() && candidate.primary_position() == position)
        }))
    }

    fn provider_search(&self, source: &SourceRecord) -> Result<Option<SourceRecord>> {
        match self.catalog.search {
            Some(search) => search.search_by_name(&source.display_name, source.team_code.as_deref()),
            None => Ok(None),
        }
    }
}

fn is_defense_entry(record: &SourceRecord) -> bool {
    record.primary_position().as_deref() == Some("DEF")
}

fn no_comparable_name(strategy: MatchStrategy, source: &SourceRecord) -> IdentityError {
    IdentityError::Strategy {
        strategy,
        message: format!("{} record {:?} has no comparable name", source.provider, source.native_id),
    }
}
