//! Player Identity - cross-provider player resolution
//!
//! Takes player records from the league manager (Yahoo), the player database
//! (Sleeper) and the stats/projections feed (Tank01), finds the records that
//! describe the same player, and merges them into one profile per player with
//! the strategy and confidence that produced each link.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod index;
pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod stats;
pub mod teams;
pub mod types;

#[cfg(test)]
mod integration_tests;

pub use aggregate::aggregate;
pub use config::{ProviderLink, ResolverConfig};
pub use error::{IdentityError, Result};
pub use index::CrossReferenceIndex;
pub use matcher::{CatalogStatus, Matcher, NameSearch, ProviderCatalog};
pub use normalize::{normalize, team_equal, NormalizedName};
pub use resolver::{resolve_batch, resolve_batch_sharded, BatchResolution, UnmatchedReason, UnmatchedRecord};
pub use stats::{BatchWarning, ProviderStats, ResolutionStats};
pub use types::{Confidence, MatchResult, MatchStrategy, Provider, SourceRecord, UnifiedProfile};
