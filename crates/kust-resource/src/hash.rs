//! Content hashes for generated resources

use crate::{Error, Resource, Result};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

const SUFFIX_LEN: usize = 10;

/// Name suffix derived from a ConfigMap or Secret's content.
///
/// Only the kind, name, data (and a Secret's type) feed the hash, so label
/// or annotation changes never trigger a rename.
pub fn hash_suffix(resource: &Resource) -> Result<String> {
    let object = resource.object();
    let field = |key: &str| object.get(key).cloned().unwrap_or(Value::Null);

    let mut encoded = match resource.kind() {
        "ConfigMap" => json!({
            "kind": "ConfigMap",
            "name": resource.name(),
            "data": field("data"),
        }),
        "Secret" => json!({
            "kind": "Secret",
            "name": resource.name(),
            "type": field("type"),
            "data": field("data"),
        }),
        other => {
            return Err(Error::Unhashable {
                kind: other.to_string(),
                name: resource.name().to_string(),
            });
        }
    };
    if let (Some(binary), Value::Object(map)) = (
        object.get("binaryData").filter(|v| !v.is_null()),
        &mut encoded,
    ) {
        map.insert("binaryData".to_string(), binary.clone());
    }

    let digest = Sha256::digest(serde_json::to_vec(&encoded)?);
    Ok(encode_suffix(&format!("{digest:x}")))
}

/// Remap hex so a suffix never reads as a number and avoids vowels.
fn encode_suffix(hex: &str) -> String {
    hex.chars()
        .take(SUFFIX_LEN)
        .map(|c| match c {
            '0' => 'g',
            '1' => 'h',
            '3' => 'k',
            'a' => 'm',
            'e' => 't',
            other => other,
        })
        .collect()
}
