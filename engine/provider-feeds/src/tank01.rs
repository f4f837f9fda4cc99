//! Tank01 NFL player list (`getNFLPlayerList`)

use crate::extract::{first_str, get_string_lossy};
use player_identity::teams::canonical_team;
use player_identity::{IdentityError, Provider, Result, SourceRecord};
use serde_json::Value;
use tracing::{debug, warn};

/// Foreign id fields Tank01 embeds in each player
pub const FOREIGN_ID_FIELDS: [&str; 3] = ["yahooID", "sleeperBotID", "espnID"];

const CONSUMED_KEYS: [&str; 7] = ["playerID", "longName", "team", "pos", "yahooID", "sleeperBotID", "espnID"];

/// Adapt one Tank01 player object
pub fn player_from_value(value: &Value) -> Result<SourceRecord> {
    let Value::Object(map) = value else {
        return Err(IdentityError::malformed(Provider::Tank01, "player entry is not an object"));
    };

    let name = first_str(value, &[&["longName"], &["espnName"], &["cbsLongName"]]).unwrap_or_default();
    let mut record = SourceRecord::new(Provider::Tank01, name);

    if let Some(id) = get_string_lossy(value, &["playerID"]) {
        record = record.with_native_id(id);
    }
    if let Some(team) = first_str(value, &[&["team"]]) {
        record = record.with_team(canonical_team(team));
    }
    if let Some(pos) = first_str(value, &[&["pos"]]) {
        record = record.with_position(pos.to_uppercase());
    }
    for field in FOREIGN_ID_FIELDS {
        if let Some(id) = get_string_lossy(value, &[field]) {
            record = record.with_foreign_id(field, id);
        }
    }

    let mut rest = map.clone();
    for key in CONSUMED_KEYS {
        rest.remove(key);
    }
    record.attributes = rest;
    Ok(record)
}

/// Adapt the player list: a bare array or the API's `{"body": [...]}` envelope
pub fn players_from_value(payload: &Value) -> Result<Vec<SourceRecord>> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("body") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(IdentityError::payload(Provider::Tank01, "response has no `body` player list"))
            }
        },
        _ => return Err(IdentityError::payload(Provider::Tank01, "player list is not an array or object")),
    };

    let records: Vec<SourceRecord> = items
        .iter()
        .filter_map(|item| match player_from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping Tank01 player: {}", e);
                None
            }
        })
        .collect();

    debug!("Adapted {} Tank01 players", records.len());
    Ok(records)
}
