//! Resolver configuration

use crate::error::{IdentityError, Result};
use crate::types::Provider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Which field of `target`'s bulk records embeds `source`'s native id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLink {
    pub source: Provider,
    pub target: Provider,
    pub foreign_id_field: String,
}

impl ProviderLink {
    pub fn new(source: Provider, target: Provider, foreign_id_field: &str) -> Self {
        Self { source, target, foreign_id_field: foreign_id_field.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Resolve shards on the rayon pool
    pub enabled: bool,

    /// Primary records per shard
    pub shard_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,
}

/// Top-level resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub links: Vec<ProviderLink>,
    pub parallel: ParallelConfig,
    pub logging: LoggingConfig,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self { enabled: false, shard_size: 256 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            links: vec![
                ProviderLink::new(Provider::Yahoo, Provider::Sleeper, "yahoo_id"),
                ProviderLink::new(Provider::Yahoo, Provider::Tank01, "yahooID"),
                ProviderLink::new(Provider::Sleeper, Provider::Tank01, "sleeperBotID"),
            ],
            parallel: ParallelConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Defaults, then the TOML file if given, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!("Loading resolver configuration from {:?}", path);
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override settings from `IDENTITY_*` environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(level) = std::env::var("IDENTITY_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("IDENTITY_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(parallel) = std::env::var("IDENTITY_PARALLEL") {
            self.parallel.enabled = parallel.parse().map_err(|_| {
                IdentityError::Config(format!("Invalid IDENTITY_PARALLEL: {parallel}"))
            })?;
        }

        if let Ok(shard_size) = std::env::var("IDENTITY_SHARD_SIZE") {
            self.parallel.shard_size = shard_size.parse().map_err(|_| {
                IdentityError::Config(format!("Invalid IDENTITY_SHARD_SIZE: {shard_size}"))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(IdentityError::Config(format!("Invalid log level: {other}"))),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            other => return Err(IdentityError::Config(format!("Invalid log format: {other}"))),
        }

        if self.parallel.shard_size == 0 {
            return Err(IdentityError::Config("shard_size must be greater than zero".to_string()));
        }

        let mut pairs = BTreeSet::new();
        for link in &self.links {
            if link.source == link.target {
                return Err(IdentityError::Config(format!("{} cannot link to itself", link.source)));
            }
            if link.foreign_id_field.trim().is_empty() {
                return Err(IdentityError::Config(format!(
                    "{} -> {} link has no foreign id field",
                    link.source, link.target
                )));
            }
            if !pairs.insert((link.source, link.target)) {
                return Err(IdentityError::Config(format!(
                    "duplicate link {} -> {}",
                    link.source, link.target
                )));
            }
        }

        Ok(())
    }

    /// Foreign id field to index `target` by when resolving `source` records
    pub fn foreign_id_field(&self, source: Provider, target: Provider) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.source == source && l.target == target)
            .map(|l| l.foreign_id_field.as_str())
    }
}
