use super::sources::{DataValue, collect_data};
use super::{metadata, needs_hash};
use crate::Result;
use crate::kustomization::{GeneratorArgs, GeneratorOptions};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kust_fs::Loader;
use kust_resource::{ResMap, Resource};
use serde_json::{Map, Value, json};

const DEFAULT_SECRET_TYPE: &str = "Opaque";

/// Generate one Secret per entry. Every value is base64-encoded.
pub fn secrets_from_args(
    loader: &dyn Loader,
    args: &[GeneratorArgs],
    options: Option<&GeneratorOptions>,
) -> Result<ResMap> {
    let mut generated = ResMap::new();
    for entry in args {
        let mut data = Map::new();
        for (key, value) in collect_data(loader, entry)? {
            let encoded = match value {
                DataValue::Text(text) => STANDARD.encode(text),
                DataValue::Binary(bytes) => STANDARD.encode(bytes),
            };
            data.insert(key, Value::String(encoded));
        }

        let object = json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": metadata(entry, options),
            "type": entry.secret_type.as_deref().unwrap_or(DEFAULT_SECRET_TYPE),
            "data": data,
        });
        tracing::debug!(name = %entry.name, "Generated Secret");
        generated.insert(Resource::generated(object, needs_hash(options))?)?;
    }
    Ok(generated)
}
