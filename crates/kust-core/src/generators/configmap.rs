use super::sources::{DataValue, collect_data};
use super::{metadata, needs_hash};
use crate::kustomization::{GeneratorArgs, GeneratorOptions};
use crate::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kust_fs::Loader;
use kust_resource::{ResMap, Resource};
use serde_json::{Map, Value, json};

/// Generate one ConfigMap per entry.
///
/// UTF-8 values land in `data`; anything else is base64-encoded into
/// `binaryData`.
pub fn configmaps_from_args(
    loader: &dyn Loader,
    args: &[GeneratorArgs],
    options: Option<&GeneratorOptions>,
) -> Result<ResMap> {
    let mut generated = ResMap::new();
    for entry in args {
        let resource = generate(loader, entry, options)?;
        tracing::debug!(name = %entry.name, hashed = resource.needs_hash(), "Generated ConfigMap");
        generated.insert(resource)?;
    }
    Ok(generated)
}

fn generate(
    loader: &dyn Loader,
    args: &GeneratorArgs,
    options: Option<&GeneratorOptions>,
) -> Result<Resource> {
    if args.secret_type.is_some() {
        return Err(Error::Generator {
            name: args.name.clone(),
            reason: "a ConfigMap cannot have a type".to_string(),
        });
    }

    let mut data = Map::new();
    let mut binary = Map::new();
    for (key, value) in collect_data(loader, args)? {
        match value {
            DataValue::Text(text) => data.insert(key, Value::String(text)),
            DataValue::Binary(bytes) => binary.insert(key, Value::String(STANDARD.encode(bytes))),
        };
    }

    let mut object = json!({
        "apiVersion": "v1",
        "kind": "ConfigMap",
        "metadata": metadata(args, options),
    });
    if let Value::Object(map) = &mut object {
        if !data.is_empty() {
            map.insert("data".to_string(), Value::Object(data));
        }
        if !binary.is_empty() {
            map.insert("binaryData".to_string(), Value::Object(binary));
        }
    }

    Ok(Resource::generated(object, needs_hash(options))?)
}
