use crate::normalize::{normalize, NormalizedName};
use crate::teams;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One of the three independent data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Fantasy league manager (rosters, free agents)
    Yahoo,
    /// League-agnostic player database
    Sleeper,
    /// Stats and projections feed
    Tank01,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Yahoo, Provider::Sleeper, Provider::Tank01];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Yahoo => "yahoo",
            Provider::Sleeper => "sleeper",
            Provider::Tank01 => "tank01",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Provider::Yahoo),
            "sleeper" => Ok(Provider::Sleeper),
            "tank01" => Ok(Provider::Tank01),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// A single player as reported by one provider, already adapted to the
/// common shape. Provider-specific fields ride along in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Provider that issued this record
    pub provider: Provider,

    /// Provider-local player id (e.g. Yahoo "40901"), absent for some feeds
    pub native_id: Option<String>,

    /// Display name as the provider spells it (e.g. "Gabe Davis Jr.")
    pub display_name: String,

    /// Team abbreviation, canonicalized at the adapter boundary
    pub team_code: Option<String>,

    /// Position code, possibly comma separated ("WR,TE")
    pub position: Option<String>,

    /// Other providers' ids embedded in this record, keyed by upstream field name
    #[serde(default)]
    pub foreign_ids: BTreeMap<String, String>,

    /// Remaining provider fields, carried through unchanged
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl SourceRecord {
    /// Create a record with only a provider and a display name
    pub fn new(provider: Provider, display_name: impl Into<String>) -> Self {
        Self {
            provider,
            native_id: None,
            display_name: display_name.into(),
            team_code: None,
            position: None,
            foreign_ids: BTreeMap::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_native_id(mut self, id: impl Into<String>) -> Self {
        self.native_id = non_empty(id.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team_code = non_empty(team.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = non_empty(position.into());
        self
    }

    pub fn with_foreign_id(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        if let Some(value) = non_empty(value.into()) {
            self.foreign_ids.insert(field.into(), value);
        }
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Normalized form of the display name
    pub fn normalized_name(&self) -> NormalizedName {
        normalize(&self.display_name)
    }

    /// First listed position, upper-cased ("wr,te" -> "WR")
    pub fn primary_position(&self) -> Option<String> {
        self.position
            .as_deref()
            .and_then(|p| p.split(',').next())
            .map(|p| p.trim().to_uppercase())
            .filter(|p| !p.is_empty())
    }

    /// Trimmed foreign id stored under `field`, if any
    pub fn foreign_id(&self, field: &str) -> Option<&str> {
        self.foreign_ids.get(field).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Whether this record stands for a team defense unit rather than a person.
    ///
    /// True for position `DEF`, and for the provider quirk where the player
    /// name is just the team (code, franchise name or city).
    pub fn is_team_defense(&self) -> bool {
        if self.primary_position().as_deref() == Some("DEF") {
            return true;
        }
        let Some(team) = self.team_code.as_deref() else {
            return false;
        };
        let name = self.normalized_name();
        if name.is_empty() {
            return false;
        }
        if name == normalize(team) {
            return true;
        }
        match teams::franchise(team) {
            Some(franchise) => {
                name == normalize(franchise.name) || name == normalize(franchise.city)
            }
            None => false,
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Which tier of the matching chain produced a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    DirectId,
    TeamDefense,
    ExactNameTeam,
    LastNameTeamOrPosition,
    ProviderSearch,
    None,
}

impl MatchStrategy {
    /// Confidence attached to a hit from this tier
    pub fn confidence(&self) -> Confidence {
        match self {
            MatchStrategy::DirectId | MatchStrategy::TeamDefense | MatchStrategy::ExactNameTeam => {
                Confidence::High
            }
            MatchStrategy::LastNameTeamOrPosition => Confidence::Medium,
            MatchStrategy::ProviderSearch => Confidence::Low,
            MatchStrategy::None => Confidence::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::DirectId => "direct_id",
            MatchStrategy::TeamDefense => "team_defense",
            MatchStrategy::ExactNameTeam => "exact_name_team",
            MatchStrategy::LastNameTeamOrPosition => "last_name_team_or_position",
            MatchStrategy::ProviderSearch => "provider_search",
            MatchStrategy::None => "none",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    None,
}

/// Outcome of matching one source record against one target provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: bool,
    pub target: Option<SourceRecord>,
    pub strategy: MatchStrategy,
    pub confidence: Confidence,
}

impl MatchResult {
    pub fn hit(strategy: MatchStrategy, target: SourceRecord) -> Self {
        Self { matched: true, target: Some(target), strategy, confidence: strategy.confidence() }
    }

    pub fn miss() -> Self {
        Self {
            matched: false,
            target: None,
            strategy: MatchStrategy::None,
            confidence: Confidence::None,
        }
    }

    /// Provenance without the matched record itself
    pub fn provenance(&self) -> MatchProvenance {
        MatchProvenance {
            matched: self.matched,
            strategy: self.strategy,
            confidence: self.confidence,
            target_id: self.target.as_ref().and_then(|t| t.native_id.clone()),
        }
    }
}

/// How a provider slot of a profile was filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProvenance {
    pub matched: bool,
    pub strategy: MatchStrategy,
    pub confidence: Confidence,
    /// Native id of the linked record, when it has one
    pub target_id: Option<String>,
}

/// One player seen through every provider. Each provider's record keeps its
/// own fields; nothing is merged across namespaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedProfile {
    /// Record the batch was driven from
    pub primary: SourceRecord,

    /// Linked record per secondary provider, `None` when unresolved
    pub linked: BTreeMap<Provider, Option<SourceRecord>>,

    /// Strategy and confidence per secondary provider
    pub match_provenance: BTreeMap<Provider, MatchProvenance>,
}

impl UnifiedProfile {
    /// Record for `provider`, including the primary one
    pub fn record(&self, provider: Provider) -> Option<&SourceRecord> {
        if provider == self.primary.provider {
            return Some(&self.primary);
        }
        self.linked.get(&provider).and_then(|r| r.as_ref())
    }

    /// Secondary providers that could not be resolved, in provider order
    pub fn unmatched_providers(&self) -> Vec<Provider> {
        self.linked.iter().filter(|(_, r)| r.is_none()).map(|(p, _)| *p).collect()
    }

    /// Whether every secondary provider was resolved
    pub fn is_fully_matched(&self) -> bool {
        self.linked.values().all(|r| r.is_some())
    }
}
