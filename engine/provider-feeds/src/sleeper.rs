//! Sleeper player database (`/v1/players/nfl`)

use crate::extract::scalar_to_string;
use player_identity::teams::canonical_team;
use player_identity::{IdentityError, Provider, Result, SourceRecord};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Foreign id fields Sleeper embeds in each player
pub const FOREIGN_ID_FIELDS: [&str; 3] = ["yahoo_id", "espn_id", "sportradar_id"];

/// One entry of the Sleeper player database
#[derive(Debug, Clone, Deserialize)]
pub struct SleeperPlayer {
    #[serde(default)]
    pub player_id: Option<Value>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub yahoo_id: Option<Value>,
    #[serde(default)]
    pub espn_id: Option<Value>,
    #[serde(default)]
    pub sportradar_id: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SleeperPlayer {
    fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return full.to_string();
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" ")
    }

    /// Convert into the common record shape. `key` is the database key the
    /// entry was stored under, used when the entry carries no `player_id`.
    pub fn into_record(self, key: Option<&str>) -> SourceRecord {
        let native_id = self
            .player_id
            .as_ref()
            .and_then(scalar_to_string)
            .or_else(|| key.map(str::to_string));
        let position = self.position.as_deref().map(str::trim).unwrap_or_default().to_uppercase();

        // Team defenses are keyed by their team code and often have no team set
        let team = self
            .team
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| if position == "DEF" { native_id.clone() } else { None })
            .map(|t| canonical_team(&t));

        let mut record = SourceRecord::new(Provider::Sleeper, self.display_name());
        if let Some(id) = native_id {
            record = record.with_native_id(id);
        }
        if let Some(team) = team {
            record = record.with_team(team);
        }
        record = record.with_position(position);

        let ids = [
            ("yahoo_id", self.yahoo_id.as_ref()),
            ("espn_id", self.espn_id.as_ref()),
            ("sportradar_id", self.sportradar_id.as_ref()),
        ];
        for (field, value) in ids {
            if let Some(id) = value.and_then(scalar_to_string) {
                record = record.with_foreign_id(field, id);
            }
        }

        record.attributes = self.extra;
        for (field, name) in [("first_name", self.first_name), ("last_name", self.last_name)] {
            if let Some(name) = name {
                record.attributes.insert(field.to_string(), Value::String(name));
            }
        }
        record
    }
}

fn player_from_entry(key: Option<&str>, value: &Value) -> Option<SourceRecord> {
    match SleeperPlayer::deserialize(value) {
        Ok(player) => Some(player.into_record(key)),
        Err(e) => {
            warn!("Skipping unreadable Sleeper player {}: {}", key.unwrap_or("<unkeyed>"), e);
            None
        }
    }
}

/// Adapt the full player database.
///
/// The API returns an object keyed by player id; a plain list is accepted as
/// well. Object entries come out in ascending key order.
pub fn players_from_value(payload: &Value) -> Result<Vec<SourceRecord>> {
    let records: Vec<SourceRecord> = match payload {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .filter_map(|key| player_from_entry(Some(key), &map[key.as_str()]))
                .collect()
        }
        Value::Array(items) => items.iter().filter_map(|item| player_from_entry(None, item)).collect(),
        other => {
            return Err(IdentityError::payload(
                Provider::Sleeper,
                format!("player database is not an object or list: {}", type_name(other)),
            ))
        }
    };

    debug!("Adapted {} Sleeper players", records.len());
    Ok(records)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_players_keyed_by_id() {
        let payload = json!({
            "4984": {
                "player_id": "4984",
                "full_name": "Josh Allen",
                "first_name": "Josh",
                "last_name": "Allen",
                "team": "BUF",
                "position": "QB",
                "yahoo_id": 30977,
                "espn_id": "3918298",
                "sportradar_id": null,
                "status": "Active"
            },
            "CHI": {"player_id": "CHI", "first_name": "Chicago", "last_name": "Bears", "position": "DEF", "team": null}
        });

        let records = players_from_value(&payload).unwrap();
        assert_eq!(records.len(), 2);

        let allen = &records[0];
        assert_eq!(allen.native_id.as_deref(), Some("4984"));
        assert_eq!(allen.display_name, "Josh Allen");
        assert_eq!(allen.foreign_id("yahoo_id"), Some("30977"));
        assert_eq!(allen.foreign_id("espn_id"), Some("3918298"));
        assert_eq!(allen.foreign_id("sportradar_id"), None);
        assert_eq!(allen.attributes.get("status"), Some(&json!("Active")));

        let bears = &records[1];
        assert_eq!(bears.display_name, "Chicago Bears");
        assert_eq!(bears.team_code.as_deref(), Some("CHI"));
        assert!(bears.is_team_defense());
    }

    #[test]
    fn test_unreadable_entries_are_skipped() {
        let payload = json!({
            "1": {"player_id": "1", "full_name": "Good Player", "team": "KC", "position": "RB"},
            "2": "garbage",
            "3": {"player_id": "3", "full_name": 17}
        });

        let records = players_from_value(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name, "Good Player");
    }

    #[test]
    fn test_list_payload_and_key_fallback() {
        let records = players_from_value(&json!([{"full_name": "Gabe Davis", "team": "JAC", "position": "wr"}])).unwrap();
        assert_eq!(records[0].native_id, None);
        assert_eq!(records[0].team_code.as_deref(), Some("JAX"));
        assert_eq!(records[0].position.as_deref(), Some("WR"));

        let keyed = players_from_value(&json!({"5859": {"full_name": "Gabe Davis"}})).unwrap();
        assert_eq!(keyed[0].native_id.as_deref(), Some("5859"));
    }

    #[test]
    fn test_non_container_payload_is_rejected() {
        let err = players_from_value(&json!("players")).unwrap_err();
        assert!(matches!(err, IdentityError::InvalidPayload { provider: Provider::Sleeper, .. }));
    }
}
