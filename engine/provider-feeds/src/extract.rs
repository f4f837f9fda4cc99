//! Tolerant lookups into loosely shaped JSON payloads.
//!
//! Every helper returns `None` for a missing path, a null, or a value of the
//! wrong type. Nothing here errors or panics.

use serde_json::{Map, Value};

/// Follow `path` through objects (by key) and arrays (by numeric index)
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Trimmed, non-empty string at `path`
pub fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    get_path(value, path).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

/// String at `path`, with numbers and booleans rendered as text
pub fn get_string_lossy(value: &Value, path: &[&str]) -> Option<String> {
    get_path(value, path).and_then(scalar_to_string)
}

/// First non-empty string among several candidate paths
pub fn first_str<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths.iter().find_map(|path| get_str(value, path))
}

/// Render a scalar as a trimmed, non-empty string
pub fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Merge a "list of chunks" payload into one object.
///
/// Some APIs send a player as `[[{"player_key":..},{"name":..}], {"selected_position":..}]`.
/// Objects are merged in order (later keys win), nested lists are walked.
/// An object input is returned as is; anything else gives an empty map.
pub fn flatten_chunks(value: &Value) -> Map<String, Value> {
    let mut merged = Map::new();
    collect_chunks(value, &mut merged);
    merged
}

fn collect_chunks(value: &Value, merged: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, item) in map {
                merged.insert(key.clone(), item.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_chunks(item, merged);
            }
        }
        _ => {}
    }
}
