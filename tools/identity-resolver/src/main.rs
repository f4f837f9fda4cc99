//! Identity Resolver CLI
//!
//! Reads a saved roster plus the bulk player databases of the other
//! providers, links every roster player across providers, and writes the
//! unified profiles as JSON.

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use player_identity::{
    resolve_batch, resolve_batch_sharded, BatchResolution, IdentityError, Provider, ProviderCatalog,
    ResolverConfig, SourceRecord,
};
use provider_feeds::{sleeper, yahoo, DatabaseSearch};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PrimaryKind {
    Yahoo,
    Sleeper,
}

impl PrimaryKind {
    fn provider(self) -> Provider {
        match self {
            PrimaryKind::Yahoo => Provider::Yahoo,
            PrimaryKind::Sleeper => Provider::Sleeper,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "identity-resolver")]
#[command(about = "Link roster players to their Sleeper and Tank01 records")]
#[command(version)]
struct Cli {
    /// Saved roster payload of the primary provider
    #[arg(long)]
    primary: PathBuf,

    /// Which provider the roster comes from
    #[arg(long, value_enum, default_value = "yahoo")]
    primary_kind: PrimaryKind,

    /// Sleeper player database (/v1/players/nfl response)
    #[arg(long)]
    sleeper: Option<PathBuf>,

    /// Tank01 player list (getNFLPlayerList response)
    #[arg(long)]
    tank01: Option<PathBuf>,

    /// Resolver configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON result here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Resolve in parallel shards
    #[arg(long)]
    parallel: bool,
}

/// A target provider's adapted bulk database, or why it could not be built
struct Feed {
    provider: Provider,
    records: std::result::Result<Vec<SourceRecord>, IdentityError>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ResolverConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if cli.parallel {
        config.parallel.enabled = true;
    }
    logging::initialize_logging(&config.logging)?;

    info!("Starting identity resolver v{}", env!("CARGO_PKG_VERSION"));

    let primary_provider = cli.primary_kind.provider();
    let primary = load_primary(&cli.primary, cli.primary_kind).await?;
    info!("Loaded {} {} roster players", primary.len(), primary_provider);

    let mut targets = Vec::new();
    for (provider, path) in [(Provider::Sleeper, &cli.sleeper), (Provider::Tank01, &cli.tank01)] {
        let Some(path) = path else { continue };
        if provider == primary_provider {
            bail!("--{} cannot be used when the roster itself comes from {}", provider, provider);
        }
        targets.push((provider, path.as_path()));
    }
    if targets.is_empty() {
        warn!("No target databases given, every profile will be empty");
    }

    let feeds = load_feeds(&targets).await;
    let resolution = resolve(&primary, primary_provider, &feeds, &config)?;

    let json = serde_json::to_string_pretty(&resolution)?;
    match &cli.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} profiles to {}", resolution.profiles.len(), path.display());
        }
        None => println!("{json}"),
    }

    print_summary(&resolution);
    Ok(())
}

async fn read_json(path: &Path) -> Result<serde_json::Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

async fn load_primary(path: &Path, kind: PrimaryKind) -> Result<Vec<SourceRecord>> {
    let payload = read_json(path).await?;
    let records = match kind {
        PrimaryKind::Yahoo => yahoo::roster_players(&payload)?,
        PrimaryKind::Sleeper => sleeper::players_from_value(&payload)?,
    };
    Ok(records)
}

/// Load each target database. A feed that cannot be read or adapted is kept
/// as an error so the batch still runs with that provider unavailable.
async fn load_feeds(targets: &[(Provider, &Path)]) -> Vec<Feed> {
    let mut feeds = Vec::with_capacity(targets.len());
    for &(provider, path) in targets {
        let records = match tokio::fs::read_to_string(path).await {
            Ok(text) => serde_json::from_str(&text)
                .map_err(IdentityError::from)
                .and_then(|payload| provider_feeds::bulk_records(provider, &payload)),
            Err(e) => Err(IdentityError::from(e)),
        };
        match &records {
            Ok(records) => info!("Loaded {} {} players from {}", records.len(), provider, path.display()),
            Err(e) => warn!("{} database {} unusable: {}", provider, path.display(), e),
        }
        feeds.push(Feed { provider, records });
    }
    feeds
}

fn resolve(
    primary: &[SourceRecord],
    primary_provider: Provider,
    feeds: &[Feed],
    config: &ResolverConfig,
) -> Result<BatchResolution> {
    let searches: Vec<Option<DatabaseSearch<'_>>> =
        feeds.iter().map(|feed| feed.records.as_ref().ok().map(|r| DatabaseSearch::new(r))).collect();

    let catalogs: Vec<ProviderCatalog<'_>> = feeds
        .iter()
        .zip(&searches)
        .map(|(feed, search)| {
            let field = config.foreign_id_field(primary_provider, feed.provider);
            let catalog = ProviderCatalog::from_result(feed.provider, &feed.records, field);
            match search {
                Some(search) => catalog.with_search(search),
                None => catalog,
            }
        })
        .collect();

    let resolution = if config.parallel.enabled {
        resolve_batch_sharded(primary, &catalogs, config.parallel.shard_size)?
    } else {
        resolve_batch(primary, &catalogs)?
    };
    Ok(resolution)
}

fn print_summary(resolution: &BatchResolution) {
    let stats = &resolution.stats;

    eprintln!();
    eprintln!("{}", "Identity Resolution Summary".cyan().bold());
    eprintln!("===========================");
    eprintln!("Processed: {}", stats.processed);
    eprintln!("Matched:   {}", stats.matched.to_string().green());
    eprintln!("Unmatched: {}", stats.unmatched.to_string().yellow());
    if stats.errors > 0 {
        eprintln!("Errors:    {}", stats.errors.to_string().red());
    }
    if let Some(ms) = stats.duration_ms {
        eprintln!("Duration:  {ms} ms");
    }

    for (provider, counts) in &stats.by_provider {
        eprintln!();
        eprintln!("{} ({} matched, {} unmatched)", provider.to_string().bold(), counts.matched, counts.unmatched);
        for (strategy, count) in &counts.strategies {
            eprintln!("  {:<28} {}", strategy.as_str(), count);
        }
    }

    for warning in &stats.warnings {
        eprintln!("{} {}: {}", "warning".yellow().bold(), warning.provider, warning.detail);
    }

    if !resolution.unmatched.is_empty() {
        eprintln!();
        eprintln!("{}", "Unmatched players".yellow().bold());
        for miss in &resolution.unmatched {
            let team = miss.record.team_code.as_deref().unwrap_or("-");
            eprintln!("  {} ({}) -> {} [{:?}]", miss.record.display_name, team, miss.provider, miss.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use player_identity::MatchStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_file(value: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{value}").unwrap();
        file
    }

    fn roster_file() -> NamedTempFile {
        json_file(serde_json::json!({"players": [
            {"player_id": "40901", "name": {"full": "Josh Allen"}, "editorial_team_abbr": "Buf", "display_position": "QB"},
            {"player_id": "100006", "name": {"full": "Chicago"}, "editorial_team_abbr": "Chi", "display_position": "DEF"},
            {"player_id": "32723", "name": {"full": "Gabe Davis Jr."}, "editorial_team_abbr": "Buf", "display_position": "WR"}
        ]}))
    }

    fn sleeper_file() -> NamedTempFile {
        json_file(serde_json::json!({
            "4984": {"player_id": "4984", "full_name": "Josh Allen", "team": "BUF", "position": "QB", "yahoo_id": 40901},
            "5859": {"player_id": "5859", "full_name": "Gabe Davis", "team": "BUF", "position": "WR"},
            "CHI": {"player_id": "CHI", "first_name": "Chicago", "last_name": "Bears", "position": "DEF"}
        }))
    }

    #[test]
    fn test_cli_parses_defaults() {
        let cli = Cli::try_parse_from(["identity-resolver", "--primary", "roster.json", "--sleeper", "players.json"]).unwrap();
        assert_eq!(cli.primary_kind, PrimaryKind::Yahoo);
        assert_eq!(cli.sleeper.as_deref(), Some(Path::new("players.json")));
        assert!(cli.tank01.is_none());
        assert!(!cli.parallel);

        assert!(Cli::try_parse_from(["identity-resolver"]).is_err());
        assert!(Cli::try_parse_from(["identity-resolver", "--primary", "r.json", "--primary-kind", "espn"]).is_err());
    }

    #[tokio::test]
    async fn test_resolves_roster_against_sleeper_file() {
        let roster = roster_file();
        let sleeper = sleeper_file();

        let primary = load_primary(roster.path(), PrimaryKind::Yahoo).await.unwrap();
        let feeds = load_feeds(&[(Provider::Sleeper, sleeper.path())]).await;
        let resolution = resolve(&primary, Provider::Yahoo, &feeds, &ResolverConfig::default()).unwrap();

        assert_eq!(resolution.stats.processed, 3);
        assert_eq!(resolution.stats.matched, 3);
        let strategies: Vec<MatchStrategy> =
            resolution.profiles.iter().map(|p| p.match_provenance[&Provider::Sleeper].strategy).collect();
        assert_eq!(
            strategies,
            vec![MatchStrategy::DirectId, MatchStrategy::TeamDefense, MatchStrategy::ExactNameTeam]
        );
    }

    #[tokio::test]
    async fn test_unreadable_feed_marks_provider_unavailable() {
        let roster = roster_file();
        let broken = json_file(serde_json::json!("not a player list"));

        let primary = load_primary(roster.path(), PrimaryKind::Yahoo).await.unwrap();
        let feeds = load_feeds(&[
            (Provider::Tank01, broken.path()),
            (Provider::Sleeper, Path::new("/nonexistent/players.json")),
        ])
        .await;
        assert!(feeds.iter().all(|feed| feed.records.is_err()));

        let mut config = ResolverConfig::default();
        config.parallel.enabled = true;
        config.parallel.shard_size = 2;
        let resolution = resolve(&primary, Provider::Yahoo, &feeds, &config).unwrap();

        assert_eq!(resolution.profiles.len(), 3);
        assert_eq!(resolution.stats.matched, 0);
        assert_eq!(resolution.unmatched.len(), 6);
        assert_eq!(resolution.stats.warnings.len(), 2);
    }
}
