//! End-to-end resolution scenarios across all three providers

use crate::error::Result;
use crate::matcher::{Matcher, NameSearch, ProviderCatalog};
use crate::resolver::{resolve_batch, UnmatchedReason};
use crate::stats::WarningKind;
use crate::types::{Confidence, MatchStrategy, Provider, SourceRecord};
use crate::ResolverConfig;
use proptest::prelude::*;

fn yahoo(id: &str, name: &str, team: &str, pos: &str) -> SourceRecord {
    SourceRecord::new(Provider::Yahoo, name).with_native_id(id).with_team(team).with_position(pos)
}

fn sleeper(id: &str, name: &str, team: &str, pos: &str) -> SourceRecord {
    SourceRecord::new(Provider::Sleeper, name).with_native_id(id).with_team(team).with_position(pos)
}

fn tank01(id: &str, name: &str, team: &str, pos: &str) -> SourceRecord {
    SourceRecord::new(Provider::Tank01, name).with_native_id(id).with_team(team).with_position(pos)
}

fn sleeper_db() -> Vec<SourceRecord> {
    vec![
        sleeper("4984", "Josh Allen", "BUF", "QB").with_foreign_id("yahoo_id", "40901"),
        sleeper("5850", "Josh Allen", "JAX", "LB"),
        sleeper("5859", "Gabe Davis", "BUF", "WR"),
        sleeper("CHI", "Chicago Bears Defense", "CHI", "DEF"),
        sleeper("7564", "Ja'Marr Chase", "CIN", "WR").with_foreign_id("yahoo_id", "33545"),
        sleeper("4039", "Hollywood Brown", "KC", "WR"),
    ]
}

fn tank01_db() -> Vec<SourceRecord> {
    vec![
        tank01("3918298", "Josh Allen", "BUF", "QB").with_foreign_id("yahooID", "40901"),
        tank01("4035671", "Gabe Davis", "BUF", "WR"),
        tank01("DEF_6", "Chicago Bears", "CHI", "DEF"),
    ]
}

fn roster() -> Vec<SourceRecord> {
    vec![
        yahoo("40901", "Josh Allen", "BUF", "QB"),
        yahoo("100006", "Chicago", "CHI", "DEF"),
        yahoo("32723", "Gabe Davis Jr.", "BUF", "WR"),
        yahoo("33545", "Ja'Marr Chase", "CIN", "WR"),
        yahoo("31883", "Marquise Brown", "ARI", "WR"),
    ]
}

#[test]
fn test_direct_id_scenario() {
    let primary = vec![yahoo("40901", "Josh Allen", "BUF", "QB")];
    let db = vec![sleeper("4984", "Josh Allen", "BUF", "QB").with_foreign_id("yahoo_id", "40901")];
    let catalogs = vec![ProviderCatalog::new(Provider::Sleeper, &db, Some("yahoo_id"))];

    let resolution = resolve_batch(&primary, &catalogs).unwrap();
    let provenance = &resolution.profiles[0].match_provenance[&Provider::Sleeper];
    assert_eq!(provenance.strategy, MatchStrategy::DirectId);
    assert_eq!(provenance.confidence, Confidence::High);
}

#[test]
fn test_direct_id_takes_precedence_over_name() {
    let db = vec![
        sleeper("1", "Josh Allen", "BUF", "QB"),
        sleeper("2", "J. Allen", "BUF", "QB").with_foreign_id("yahoo_id", "40901"),
    ];
    let catalog = ProviderCatalog::new(Provider::Sleeper, &db, Some("yahoo_id"));

    let result = Matcher::new(&catalog).match_record(&yahoo("40901", "Josh Allen", "BUF", "QB"));
    assert_eq!(result.strategy, MatchStrategy::DirectId);
    assert_eq!(result.target.and_then(|t| t.native_id).as_deref(), Some("2"));
}

#[test]
fn test_defense_scenario() {
    let db = sleeper_db();
    let catalog = ProviderCatalog::new(Provider::Sleeper, &db, Some("yahoo_id"));

    let trace = Matcher::new(&catalog).match_traced(&SourceRecord::new(Provider::Yahoo, "Chicago").with_team("CHI").with_position("DEF"));
    assert_eq!(trace.attempted, vec![MatchStrategy::TeamDefense]);
    assert_eq!(trace.result.strategy, MatchStrategy::TeamDefense);
    let target = trace.result.target.unwrap();
    assert_eq!(target.display_name, "Chicago Bears Defense");
    assert_eq!(target.primary_position().as_deref(), Some("DEF"));
}

#[test]
fn test_suffix_scenario() {
    let db = sleeper_db();
    let catalog = ProviderCatalog::new(Provider::Sleeper, &db, Some("yahoo_id"));

    let result = Matcher::new(&catalog).match_record(&SourceRecord::new(Provider::Yahoo, "Gabe Davis Jr.").with_team("BUF"));
    assert_eq!(result.strategy, MatchStrategy::ExactNameTeam);
    assert_eq!(result.target.and_then(|t| t.native_id).as_deref(), Some("5859"));
}

#[test]
fn test_empty_primary_list() {
    let db = sleeper_db();
    let catalogs = vec![ProviderCatalog::new(Provider::Sleeper, &db, Some("yahoo_id"))];

    let resolution = resolve_batch(&[], &catalogs).unwrap();
    assert!(resolution.profiles.is_empty());
    assert!(resolution.unmatched.is_empty());
    assert_eq!(resolution.stats.processed, 0);
    assert_eq!(resolution.stats.matched, 0);
    assert_eq!(resolution.stats.unmatched, 0);
}

#[test]
fn test_empty_bulk_database_degrades_to_no_match() {
    let primary = roster();
    let empty: Vec<SourceRecord> = Vec::new();
    let catalogs = vec![ProviderCatalog::new(Provider::Tank01, &empty, Some("yahooID"))];

    let resolution = resolve_batch(&primary, &catalogs).unwrap();
    for profile in &resolution.profiles {
        let provenance = &profile.match_provenance[&Provider::Tank01];
        assert!(!provenance.matched);
        assert_eq!(provenance.strategy, MatchStrategy::None);
    }
    assert_eq!(resolution.stats.processed, primary.len() as u64);
    assert_eq!(resolution.stats.warnings.len(), 1);
    assert_eq!(resolution.stats.warnings[0].kind, WarningKind::MissingBulkDatabase);
    assert!(resolution.unmatched.iter().all(|u| u.reason == UnmatchedReason::ProviderUnavailable));
    assert!(resolution.stats.duration_ms.is_some());
}

#[test]
fn test_full_roster_against_two_providers() {
    let config = ResolverConfig::default();
    let primary = roster();
    let sleeper_records = sleeper_db();
    let tank01_records = tank01_db();
    let catalogs = vec![
        ProviderCatalog::new(
            Provider::Sleeper,
            &sleeper_records,
            config.foreign_id_field(Provider::Yahoo, Provider::Sleeper),
        ),
        ProviderCatalog::new(
            Provider::Tank01,
            &tank01_records,
            config.foreign_id_field(Provider::Yahoo, Provider::Tank01),
        ),
    ];

    let resolution = resolve_batch(&primary, &catalogs).unwrap();
    let stats = &resolution.stats;

    assert_eq!(stats.processed, 5);
    // Allen, Chicago and Davis resolve everywhere; Chase and Brown miss in Tank01
    assert_eq!(stats.matched, 3);
    assert_eq!(stats.unmatched, 2);
    assert_eq!(stats.strategy_count(Provider::Sleeper, MatchStrategy::DirectId), 2);
    assert_eq!(stats.strategy_count(Provider::Sleeper, MatchStrategy::TeamDefense), 1);
    assert_eq!(stats.strategy_count(Provider::Sleeper, MatchStrategy::ExactNameTeam), 1);
    assert_eq!(stats.strategy_count(Provider::Sleeper, MatchStrategy::LastNameTeamOrPosition), 1);
    assert_eq!(stats.strategy_count(Provider::Tank01, MatchStrategy::DirectId), 1);
    assert_eq!(stats.by_provider[&Provider::Tank01].unmatched, 2);

    let brown = &resolution.profiles[4];
    assert_eq!(brown.match_provenance[&Provider::Sleeper].confidence, Confidence::Medium);
    assert_eq!(brown.record(Provider::Sleeper).map(|r| r.display_name.as_str()), Some("Hollywood Brown"));

    let missing: Vec<(&str, Provider)> =
        resolution.unmatched.iter().map(|u| (u.record.display_name.as_str(), u.provider)).collect();
    assert_eq!(missing, vec![("Ja'Marr Chase", Provider::Tank01), ("Marquise Brown", Provider::Tank01)]);

    let json = serde_json::to_value(&resolution).unwrap();
    assert_eq!(json["profiles"][0]["match_provenance"]["sleeper"]["strategy"], "direct_id");
    assert_eq!(json["profiles"][1]["linked"]["tank01"]["native_id"], "DEF_6");
    assert_eq!(json["stats"]["by_provider"]["sleeper"]["strategies"]["team_defense"], 1);
}

#[test]
fn test_resolution_round_trips_through_json() {
    let primary = roster();
    let db = sleeper_db();
    let catalogs = vec![ProviderCatalog::new(Provider::Sleeper, &db, Some("yahoo_id"))];

    let resolution = resolve_batch(&primary, &catalogs).unwrap();
    let text = serde_json::to_string(&resolution).unwrap();
    let back: crate::BatchResolution = serde_json::from_str(&text).unwrap();
    assert_eq!(back, resolution);
}

struct CountingSearch(std::sync::atomic::AtomicUsize);

impl NameSearch for CountingSearch {
    fn search_by_name(&self, _name: &str, _team: Option<&str>) -> Result<Option<SourceRecord>> {
        self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(None)
    }
}

#[test]
fn test_search_fallback_only_for_unresolved_players() {
    let primary = roster();
    let db = sleeper_db();
    let search = CountingSearch(std::sync::atomic::AtomicUsize::new(0));
    let catalogs = vec![ProviderCatalog::new(Provider::Sleeper, &db, Some("yahoo_id")).with_search(&search)];

    let resolution = resolve_batch(&primary, &catalogs).unwrap();
    assert_eq!(resolution.stats.matched, 5);
    assert_eq!(search.0.load(std::sync::atomic::Ordering::SeqCst), 0);
}

proptest! {
    #[test]
    fn prop_resolution_is_deterministic(order in Just(roster()).prop_shuffle()) {
        let sleeper_records = sleeper_db();
        let tank01_records = tank01_db();
        let catalogs = vec![
            ProviderCatalog::new(Provider::Sleeper, &sleeper_records, Some("yahoo_id")),
            ProviderCatalog::new(Provider::Tank01, &tank01_records, Some("yahooID")),
        ];

        let first = resolve_batch(&order, &catalogs).unwrap();
        let second = resolve_batch(&order, &catalogs).unwrap();

        prop_assert_eq!(&first.profiles, &second.profiles);
        prop_assert_eq!(&first.unmatched, &second.unmatched);
        prop_assert!(first.stats.same_counts(&second.stats));

        let names: Vec<&str> = first.profiles.iter().map(|p| p.primary.display_name.as_str()).collect();
        let input: Vec<&str> = order.iter().map(|r| r.display_name.as_str()).collect();
        prop_assert_eq!(names, input);
    }
}
