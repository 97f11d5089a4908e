//! Transformer rules derived from custom resource definitions
//!
//! A CRD file is a map of OpenAPI definitions, optionally wrapped in a
//! top-level `Schema` key. Any definition with `kind`, `apiVersion` and
//! `metadata` properties describes a custom kind. Its property tree is
//! walked for `x-kubernetes-*` extensions, which become extra rules for the
//! label, annotation, prefix and name-reference transformers.

use crate::config::{FieldSpec, NameBackReferences, TransformerConfig};
use crate::{Error, ErrorList, Result, ResultExt};
use kust_fs::Loader;
use kust_resource::Gvk;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const ANNOTATION: &str = "x-kubernetes-annotation";
const LABEL_SELECTOR: &str = "x-kubernetes-label-selector";
const IDENTITY: &str = "x-kubernetes-identity";
const OBJECT_REF_VERSION: &str = "x-kubernetes-object-ref-api-version";
const OBJECT_REF_KIND: &str = "x-kubernetes-object-ref-kind";
const OBJECT_REF_NAME_KEY: &str = "x-kubernetes-object-ref-name-key";

const DEFINITION_PREFIX: &str = "#/definitions/";

/// Register every CRD file in `paths`.
///
/// Files that fail to load or parse are reported in the returned list; the
/// rules from every other file are kept.
pub fn register_crds(loader: &dyn Loader, paths: &[String]) -> (TransformerConfig, ErrorList) {
    let mut config = TransformerConfig::default();
    let mut errors = ErrorList::new();
    for path in paths {
        let registered = loader
            .load(path)
            .with_context(|| format!("loading CRD {path}"))
            .and_then(|bytes| config_from_definitions(path, &bytes));
        if let Some(extra) = errors.collect(registered) {
            tracing::debug!(%path, "Registered CRD");
            config = config.merge(&extra);
        }
    }
    (config, errors)
}

fn config_from_definitions(path: &str, bytes: &[u8]) -> Result<TransformerConfig> {
    let document: Value = serde_yaml::from_slice(bytes).map_err(|e| Error::Crd {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    let document = match document.get("Schema") {
        Some(inner) => inner,
        None => &document,
    };
    let Value::Object(definitions) = document else {
        return Err(Error::Crd {
            path: path.to_string(),
            reason: "expected a map of definitions".to_string(),
        });
    };

    let mut walker = Walker {
        definitions,
        config: TransformerConfig::default(),
    };
    for (name, definition) in definitions {
        if !is_custom_kind(definition) {
            continue;
        }
        let kind = name.rsplit('.').next().unwrap_or(name);
        let gvk = Gvk::new("", "", kind);
        let mut visited = BTreeSet::new();
        walker.walk(&gvk, definition, &mut Vec::new(), &mut visited);
    }
    Ok(walker.config)
}

fn is_custom_kind(definition: &Value) -> bool {
    definition
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|props| {
            ["kind", "apiVersion", "metadata"]
                .iter()
                .all(|key| props.contains_key(*key))
        })
}

struct Walker<'a> {
    definitions: &'a Map<String, Value>,
    config: TransformerConfig,
}

impl<'a> Walker<'a> {
    fn walk(
        &mut self,
        gvk: &Gvk,
        schema: &'a Value,
        path: &mut Vec<String>,
        visited: &mut BTreeSet<&'a str>,
    ) {
        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return;
        };
        for (name, property) in properties {
            path.push(name.clone());
            self.record(gvk, property, path);

            let target = property
                .get("$ref")
                .or_else(|| property.get("items").and_then(|items| items.get("$ref")))
                .and_then(Value::as_str)
                .map(|r| r.strip_prefix(DEFINITION_PREFIX).unwrap_or(r));
            match target {
                Some(reference) => {
                    if let Some(definition) = self.definitions.get(reference) {
                        if visited.insert(reference) {
                            self.walk(gvk, definition, path, visited);
                            visited.remove(reference);
                        }
                    }
                }
                None => self.walk(gvk, property, path, visited),
            }
            path.pop();
        }
    }

    fn record(&mut self, gvk: &Gvk, property: &Value, path: &[String]) {
        let joined = path.join("/");
        let spec = || FieldSpec::new(gvk.clone(), joined.clone(), false);

        if property.get(ANNOTATION).is_some() {
            self.config.common_annotations.push(spec());
        }
        if property.get(LABEL_SELECTOR).is_some() {
            self.config.common_labels.push(spec());
        }
        if property.get(IDENTITY).is_some() {
            self.config.name_prefix.push(spec());
        }

        let Some(kind) = property.get(OBJECT_REF_KIND).and_then(Value::as_str) else {
            return;
        };
        let name_key = property
            .get(OBJECT_REF_NAME_KEY)
            .and_then(Value::as_str)
            .unwrap_or("name");
        let referenced = property
            .get(OBJECT_REF_VERSION)
            .and_then(Value::as_str)
            .map(|api_version| Gvk::from_api_version(api_version, kind))
            .unwrap_or_else(|| Gvk::new("", "", kind));
        let back_reference = NameBackReferences {
            gvk: referenced,
            field_specs: vec![FieldSpec::new(
                gvk.clone(),
                format!("{joined}/{name_key}"),
                false,
            )],
        };
        self.config = self.config.merge(&TransformerConfig {
            name_reference: vec![back_reference],
            ..Default::default()
        });
    }
}
