//! Multi-document YAML encoding

use crate::Result;
use serde::Deserialize;
use serde_json::Value;

/// Decode a YAML (or JSON) stream into documents.
///
/// Empty documents are skipped and a `kind: List` document contributes its
/// `items` instead of itself.
pub fn decode_documents(bytes: &[u8]) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_slice(bytes) {
        let value = Value::deserialize(document)?;
        push_document(&mut documents, value);
    }
    Ok(documents)
}

fn push_document(documents: &mut Vec<Value>, value: Value) {
    match value {
        Value::Null => {}
        Value::Object(mut map) if map.get("kind").and_then(Value::as_str) == Some("List") => {
            if let Some(Value::Array(items)) = map.remove("items") {
                for item in items {
                    push_document(documents, item);
                }
            }
        }
        other => documents.push(other),
    }
}

/// Encode documents as one YAML stream separated by `---`.
pub fn encode_documents(documents: &[Value]) -> Result<Vec<u8>> {
    let mut out = String::new();
    for (idx, document) in documents.iter().enumerate() {
        if idx > 0 {
            out.push_str("---\n");
        }
        out.push_str(&serde_yaml::to_string(document)?);
    }
    Ok(out.into_bytes())
}
