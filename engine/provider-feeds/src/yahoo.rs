//! Yahoo Fantasy (league manager) roster payloads

use crate::extract::{first_str, flatten_chunks, get_path, get_str};
use player_identity::teams::canonical_team;
use player_identity::{IdentityError, Provider, Result, SourceRecord};
use serde_json::{Map, Value};
use tracing::debug;

/// Keys consumed into the common record shape
const CONSUMED_KEYS: [&str; 7] =
    ["player_id", "name", "full_name", "editorial_team_abbr", "team", "display_position", "primary_position"];

/// Adapt one Yahoo player, either flat or in "list of chunks" form
pub fn player_from_value(value: &Value) -> Result<SourceRecord> {
    let flat = match value {
        Value::Object(map) => map.clone(),
        Value::Array(_) => flatten_chunks(value),
        other => {
            return Err(IdentityError::payload(
                Provider::Yahoo,
                format!("player entry is not an object or list: {other}"),
            ))
        }
    };
    Ok(player_from_map(flat))
}

fn player_from_map(flat: Map<String, Value>) -> SourceRecord {
    let value = Value::Object(flat);

    let name = display_name(&value).unwrap_or_default();
    let native_id = get_str(&value, &["player_id"])
        .map(str::to_string)
        .or_else(|| player_id_from_key(get_str(&value, &["player_key"])?));
    let team = first_str(&value, &[&["editorial_team_abbr"], &["team"]]).map(canonical_team);
    let position = first_str(&value, &[&["display_position"], &["primary_position"]]);

    let mut record = SourceRecord::new(Provider::Yahoo, name);
    if let Some(id) = native_id {
        record = record.with_native_id(id);
    }
    if let Some(team) = team {
        record = record.with_team(team);
    }
    if let Some(position) = position {
        record = record.with_position(position);
    }

    if let Value::Object(mut rest) = value {
        for key in CONSUMED_KEYS {
            rest.remove(key);
        }
        record.attributes = rest;
    }
    record
}

fn display_name(value: &Value) -> Option<String> {
    if let Some(full) = get_str(value, &["name", "full"]) {
        return Some(full.to_string());
    }
    let first = get_str(value, &["name", "first"]);
    let last = get_str(value, &["name", "last"]);
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => get_str(value, &["full_name"]).map(str::to_string),
    }
}

/// "461.p.40901" -> "40901"
fn player_id_from_key(key: &str) -> Option<String> {
    key.rsplit_once(".p.").map(|(_, id)| id.trim().to_string()).filter(|id| !id.is_empty())
}

/// Players of a saved roster payload, in roster order.
///
/// Accepts a bare list of players, an object with a `players` list, or the
/// raw `fantasy_content.team[..].roster."0".players."<n>".player` tree.
pub fn roster_players(raw: &Value) -> Result<Vec<SourceRecord>> {
    let entries: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match map.get("players") {
            Some(Value::Array(items)) if !items.is_empty() => items.iter().collect(),
            _ => fantasy_content_players(raw),
        },
        other => {
            return Err(IdentityError::payload(
                Provider::Yahoo,
                format!("roster payload is not an object or list: {other}"),
            ))
        }
    };

    debug!("Adapting {} Yahoo roster entries", entries.len());
    entries.into_iter().map(player_from_value).collect()
}

fn fantasy_content_players(raw: &Value) -> Vec<&Value> {
    let sections = match get_path(raw, &["fantasy_content", "team"]) {
        Some(Value::Array(sections)) => sections,
        _ => return Vec::new(),
    };

    for section in sections {
        let Some(players) = get_path(section, &["roster", "0", "players"]) else {
            continue;
        };
        let mut collected = Vec::new();
        let mut index = 0usize;
        while let Some(entry) = players.get(index.to_string()) {
            if let Some(player) = entry.get("player") {
                collected.push(player);
            }
            index += 1;
        }
        if !collected.is_empty() {
            return collected;
        }
    }
    Vec::new()
}
