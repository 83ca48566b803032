//! Flattening nested JSON objects into single-level maps with joined keys.
//!
//! `{"a": {"b": 1, "c": [2, 3]}}` flattens to `{"a.b": 1, "a.c.0": 2, "a.c.1": 3}`.

use serde_json::{Map, Value};

/// Flatten nested objects and arrays; array items are keyed by index.
///
/// Scalars (and empty containers) at the top level are stored under the empty key.
pub fn flatten_json(value: &Value, separator: &str) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(value, String::new(), separator, &mut flat);
    flat
}

fn flatten_into(value: &Value, prefix: String, separator: &str, flat: &mut Map<String, Value>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", prefix, separator, key)
        }
    };

    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten_into(child, join(key), separator, flat);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(child, join(&index.to_string()), separator, flat);
            }
        }
        leaf => {
            flat.insert(prefix, leaf.clone());
        }
    }
}

/// Rebuild nested objects from a flattened map.
///
/// With `intkeys_to_lists`, any object whose keys are exactly `"0"..="n-1"`
/// becomes an array.
pub fn unflatten_json(flat: &Map<String, Value>, separator: &str, intkeys_to_lists: bool) -> Value {
    let mut root = Map::new();
    for (key, value) in flat {
        let mut path = key.split(separator);
        if let Some(first) = path.next() {
            insert_path(&mut root, first, path, value.clone());
        }
    }
    let root = Value::Object(root);
    if intkeys_to_lists {
        intkeys_to_arrays(root)
    } else {
        root
    }
}

/// Insert `value` at `key` followed by `rest`, replacing scalars found on the way
fn insert_path<'k>(
    map: &mut Map<String, Value>,
    key: &str,
    mut rest: impl Iterator<Item = &'k str>,
    value: Value,
) {
    let next = match rest.next() {
        Some(next) => next,
        None => {
            map.insert(key.to_string(), value);
            return;
        }
    };

    let child = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() {
        *child = Value::Object(Map::new());
    }
    if let Value::Object(child) = child {
        insert_path(child, next, rest, value);
    }
}

fn intkeys_to_arrays(value: Value) -> Value {
    let map = match value {
        Value::Object(map) => map,
        other => return other,
    };
    let mut converted: Map<String, Value> = map
        .into_iter()
        .map(|(key, child)| (key, intkeys_to_arrays(child)))
        .collect();

    let dense = !converted.is_empty()
        && (0..converted.len()).all(|index| converted.contains_key(&index.to_string()));
    if !dense {
        return Value::Object(converted);
    }

    let items = (0..converted.len())
        .filter_map(|index| converted.remove(&index.to_string()))
        .collect();
    Value::Array(items)
}
