//! ConfigMap and Secret generators
//!
//! Each generator entry gathers key/value pairs from literals, files and an
//! env file, then emits one resource. Generated resources are marked for
//! name hashing unless `generatorOptions.disableNameSuffixHash` is set.

mod configmap;
mod secret;
mod sources;

pub use configmap::configmaps_from_args;
pub use secret::secrets_from_args;
pub use sources::{DataValue, collect_data};

use crate::kustomization::{GeneratorArgs, GeneratorOptions};
use serde_json::{Map, Value, json};

/// Build the `metadata` block shared by both generators.
fn metadata(args: &GeneratorArgs, options: Option<&GeneratorOptions>) -> Value {
    let mut metadata = Map::new();
    metadata.insert("name".to_string(), json!(args.name));
    if !args.namespace.is_empty() {
        metadata.insert("namespace".to_string(), json!(args.namespace));
    }
    if let Some(options) = options {
        if !options.labels.is_empty() {
            metadata.insert("labels".to_string(), json!(options.labels));
        }
        if !options.annotations.is_empty() {
            metadata.insert("annotations".to_string(), json!(options.annotations));
        }
    }
    Value::Object(metadata)
}

fn needs_hash(options: Option<&GeneratorOptions>) -> bool {
    !options.is_some_and(|o| o.disable_name_suffix_hash)
}
