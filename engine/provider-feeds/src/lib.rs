//! Provider Feeds - adapters from raw provider payloads to `SourceRecord`s
//!
//! Each provider module knows the payload shape of one API and turns it into
//! the common record the identity resolver works on. Fetching the payloads is
//! left to the callers; everything here works on already-decoded JSON.

pub mod extract;
pub mod search;
pub mod sleeper;
pub mod tank01;
pub mod yahoo;

pub use search::DatabaseSearch;

use player_identity::{Provider, Result, SourceRecord};
use serde_json::Value;

/// Adapt a provider's bulk player database payload
pub fn bulk_records(provider: Provider, payload: &Value) -> Result<Vec<SourceRecord>> {
    match provider {
        Provider::Yahoo => yahoo::roster_players(payload),
        Provider::Sleeper => sleeper::players_from_value(payload),
        Provider::Tank01 => tank01::players_from_value(payload),
    }
}
