//! Name search over an already-loaded player database
//!
//! Stands in for a provider's own search endpoint when matching offline.

use player_identity::{normalize, team_equal, NameSearch, Result, SourceRecord};

/// Substring name search over a provider's bulk records
#[derive(Debug, Clone, Copy)]
pub struct DatabaseSearch<'a> {
    records: &'a [SourceRecord],
}

impl<'a> DatabaseSearch<'a> {
    pub fn new(records: &'a [SourceRecord]) -> Self {
        Self { records }
    }

    /// All non-defense records whose normalized name contains `query`, in
    /// database order
    pub fn search_players(&self, query: &str) -> Vec<&'a SourceRecord> {
        let query = normalize(query);
        if query.is_empty() {
            return Vec::new();
        }
        self.records
            .iter()
            .filter(|record| !record.is_team_defense())
            .filter(|record| record.normalized_name().as_str().contains(query.as_str()))
            .collect()
    }
}

impl NameSearch for DatabaseSearch<'_> {
    fn search_by_name(&self, name: &str, team: Option<&str>) -> Result<Option<SourceRecord>> {
        let candidates = self.search_players(name);

        // A candidate on the same team beats one that merely has no team
        let on_team = team.and_then(|team| {
            candidates.iter().find(|c| c.team_code.as_deref().is_some_and(|t| t.eq_ignore_ascii_case(team)))
        });
        let best = on_team.or_else(|| candidates.iter().find(|c| team_equal(team, c.team_code.as_deref())));

        Ok(best.map(|record| (*record).clone()))
    }
}
