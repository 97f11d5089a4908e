use super::Transformer;
use super::mutate::{invalid_value, mutate_resource};
use crate::config::FieldSpec;
use crate::{Diagnostics, Result};
use kust_resource::ResMap;
use serde_json::Value;

const SKIPPED_KINDS: [&str; 1] = ["CustomResourceDefinition"];

/// Prepends a prefix to resource names.
///
/// The prefix is also recorded on each renamed resource, so the collection
/// is re-keyed afterwards.
#[derive(Debug)]
pub struct NamePrefixTransformer {
    prefix: String,
    field_specs: Vec<FieldSpec>,
}

impl NamePrefixTransformer {
    pub fn new(prefix: impl Into<String>, field_specs: Vec<FieldSpec>) -> Self {
        Self {
            prefix: prefix.into(),
            field_specs,
        }
    }
}

impl Transformer for NamePrefixTransformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        if self.prefix.is_empty() {
            return Ok(());
        }

        for resource in resources.resources_mut() {
            if SKIPPED_KINDS.contains(&resource.kind()) {
                continue;
            }
            let mut applied = false;
            for spec in &self.field_specs {
                applied |= mutate_resource(resource, spec, &mut |value| match value {
                    Value::String(name) => {
                        name.insert_str(0, &self.prefix);
                        Ok(())
                    }
                    other => Err(invalid_value(format!("expected a string name, found {other}"))),
                })?;
            }
            if applied {
                resource.add_prefix(&self.prefix);
            }
        }

        resources.rekey()?;
        Ok(())
    }
}
