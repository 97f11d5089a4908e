//! Strategic merge patches
//!
//! A patch is a partial document merged field by field into its target:
//!
//! - mappings merge recursively, and a `null` value deletes the key;
//! - lists of mappings merge element-wise on a merge key (see
//!   [`merge_key`]); any other list is replaced;
//! - `$patch: delete` removes the mapping or list element it appears in;
//! - `$patch: replace` replaces the mapping, or the list it appears in,
//!   instead of merging.

use crate::{Error, Result};
use serde_json::{Map, Value};

const DIRECTIVE: &str = "$patch";

/// Merge `patch` into `original`, returning the merged document.
pub fn merge(original: &Value, patch: &Value) -> Result<Value> {
    match (original, patch) {
        (Value::Object(original), Value::Object(patch)) => match directive(patch) {
            Some("delete") => Err(Error::patch("'$patch: delete' cannot remove a whole resource")),
            _ => Ok(Value::Object(merge_maps(original, patch)?)),
        },
        _ => Err(Error::patch("patch and target must both be mappings")),
    }
}

fn directive(map: &Map<String, Value>) -> Option<&str> {
    map.get(DIRECTIVE).and_then(Value::as_str)
}

fn merge_maps(original: &Map<String, Value>, patch: &Map<String, Value>) -> Result<Map<String, Value>> {
    match directive(patch) {
        None => {}
        Some("replace") => return Ok(strip_directives_map(patch)),
        Some("merge") => {}
        Some(other) => return Err(Error::patch(format!("unknown directive '$patch: {other}'"))),
    }

    let mut merged = original.clone();
    for (key, patch_value) in patch {
        if key.starts_with('$') {
            continue;
        }
        match patch_value {
            Value::Null => {
                merged.remove(key);
            }
            Value::Object(p) if directive(p) == Some("delete") => {
                merged.remove(key);
            }
            Value::Object(p) => {
                let value = match merged.get(key) {
                    Some(Value::Object(o)) => merge_maps(o, p)?,
                    _ => strip_directives_map(p),
                };
                merged.insert(key.clone(), Value::Object(value));
            }
            Value::Array(p) => {
                let value = match merged.get(key) {
                    Some(Value::Array(o)) => merge_lists(key, o, p)?,
                    _ => replacement_list(p),
                };
                merged.insert(key.clone(), Value::Array(value));
            }
            scalar => {
                merged.insert(key.clone(), scalar.clone());
            }
        }
    }
    Ok(merged)
}

/// The key list elements of `field` are matched on, if they are mappings.
///
/// `volumeMounts` merge on `mountPath`, `volumeDevices` on `devicePath`,
/// `ports` on `containerPort` (or `port` for service ports), and every other
/// list of named mappings on `name`.
pub fn merge_key(field: &str, patch: &[Value]) -> Option<&'static str> {
    let mut maps = Vec::with_capacity(patch.len());
    for value in patch {
        let map = value.as_object()?;
        if directive(map) != Some("replace") {
            maps.push(map);
        }
    }
    if maps.is_empty() {
        return None;
    }

    let all_have = |key: &str| maps.iter().all(|m| m.contains_key(key));
    let candidate = match field {
        "volumeMounts" => "mountPath",
        "volumeDevices" => "devicePath",
        "ports" if all_have("containerPort") => "containerPort",
        "ports" => "port",
        _ => "name",
    };
    all_have(candidate).then_some(candidate)
}

fn merge_lists(field: &str, original: &[Value], patch: &[Value]) -> Result<Vec<Value>> {
    let replace = patch
        .iter()
        .any(|v| v.as_object().and_then(directive) == Some("replace"));
    if replace {
        return Ok(replacement_list(patch));
    }

    let Some(key) = merge_key(field, patch) else {
        return Ok(replacement_list(patch));
    };

    let mut merged = original.to_vec();
    for element in patch.iter().filter_map(Value::as_object) {
        let wanted = element.get(key);
        let position = merged
            .iter()
            .position(|existing| existing.get(key).is_some() && existing.get(key) == wanted);

        match (directive(element), position) {
            (Some("delete"), Some(idx)) => {
                merged.remove(idx);
            }
            (Some("delete"), None) => {}
            (_, Some(idx)) => {
                let value = match &merged[idx] {
                    Value::Object(existing) => merge_maps(existing, element)?,
                    _ => strip_directives_map(element),
                };
                merged[idx] = Value::Object(value);
            }
            (_, None) => merged.push(Value::Object(strip_directives_map(element))),
        }
    }
    Ok(merged)
}

fn replacement_list(patch: &[Value]) -> Vec<Value> {
    patch
        .iter()
        .filter(|v| v.as_object().and_then(directive) != Some("replace"))
        .map(strip_directives)
        .collect()
}

fn strip_directives(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_directives_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(strip_directives).collect()),
        other => other.clone(),
    }
}

fn strip_directives_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(k, v)| !k.starts_with('$') && !v.is_null())
        .map(|(k, v)| (k.clone(), strip_directives(v)))
        .collect()
}
