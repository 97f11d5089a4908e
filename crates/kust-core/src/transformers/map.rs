use super::Transformer;
use super::mutate::{invalid_value, mutate_resource};
use crate::config::FieldSpec;
use crate::{Diagnostics, Result};
use kust_resource::ResMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Merges a fixed map into configured map-valued fields.
///
/// Used for both `commonLabels` and `commonAnnotations`.
#[derive(Debug)]
pub struct MapTransformer {
    what: &'static str,
    entries: BTreeMap<String, String>,
    field_specs: Vec<FieldSpec>,
}

impl MapTransformer {
    pub fn labels(entries: BTreeMap<String, String>, field_specs: Vec<FieldSpec>) -> Self {
        Self {
            what: "labels",
            entries,
            field_specs,
        }
    }

    pub fn annotations(entries: BTreeMap<String, String>, field_specs: Vec<FieldSpec>) -> Self {
        Self {
            what: "annotations",
            entries,
            field_specs,
        }
    }

    fn apply(&self, value: &mut Value) -> Result<()> {
        if value.is_null() {
            *value = Value::Object(Map::new());
        }
        let Value::Object(map) = value else {
            return Err(invalid_value(format!(
                "{} must be a mapping, found {value}",
                self.what
            )));
        };
        for (k, v) in &self.entries {
            map.insert(k.clone(), Value::String(v.clone()));
        }
        Ok(())
    }
}

impl Transformer for MapTransformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        for resource in resources.resources_mut() {
            for spec in &self.field_specs {
                mutate_resource(resource, spec, &mut |value| self.apply(value))?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        match self.what {
            "labels" => "LabelsTransformer",
            _ => "AnnotationsTransformer",
        }
    }
}
