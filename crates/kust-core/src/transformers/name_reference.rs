use super::Transformer;
use super::mutate::{invalid_value, mutate_resource};
use crate::config::NameBackReferences;
use crate::{DiagnosticKind, Diagnostics, Result};
use kust_resource::{Gvk, ResMap};
use serde_json::Value;
use std::collections::BTreeSet;

/// Rewrites references to renamed resources.
///
/// Referring fields hold the name a resource was declared with. Once
/// prefixing and hashing are done, each such value is replaced by the
/// referenced resource's final name.
#[derive(Debug, Default)]
pub struct NameReferenceTransformer {
    back_refs: Vec<NameBackReferences>,
}

/// What a referrer needs to know about a potential referent.
struct Candidate {
    gvk: Gvk,
    original_name: String,
    prefix: String,
    name: String,
}

impl NameReferenceTransformer {
    pub fn new(back_refs: Vec<NameBackReferences>) -> Self {
        Self { back_refs }
    }
}

/// Pick the final name for `value`, a declared name of a `target` resource.
///
/// `Ok(None)` means no resource has that declared name. `Err` carries the
/// competing final names.
fn resolve(
    candidates: &[Candidate],
    target: &Gvk,
    value: &str,
    referrer_prefix: &str,
) -> std::result::Result<Option<String>, Vec<String>> {
    let matching: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.original_name == value && c.gvk.is_selected(target))
        .collect();
    if matching.is_empty() {
        return Ok(None);
    }

    let same_prefix: Vec<&Candidate> = matching
        .iter()
        .copied()
        .filter(|c| c.prefix == referrer_prefix)
        .collect();
    let preferred = if same_prefix.is_empty() {
        matching
    } else {
        same_prefix
    };

    let names: BTreeSet<&str> = preferred.iter().map(|c| c.name.as_str()).collect();
    match names.into_iter().collect::<Vec<_>>().as_slice() {
        [one] => Ok(Some(one.to_string())),
        many => Err(many.iter().map(ToString::to_string).collect()),
    }
}

impl Transformer for NameReferenceTransformer {
    fn transform(&self, resources: &mut ResMap, diagnostics: &mut Diagnostics) -> Result<()> {
        let candidates: Vec<Candidate> = resources
            .resources()
            .map(|r| Candidate {
                gvk: r.gvk(),
                original_name: r.original_name().to_string(),
                prefix: r.prefix().to_string(),
                name: r.name().to_string(),
            })
            .collect();

        for referrer in resources.resources_mut() {
            let referrer_id = referrer.id();
            let referrer_prefix = referrer.prefix().to_string();

            for back_ref in &self.back_refs {
                let target = &back_ref.gvk;
                let mut rewrite = |name: &mut String| match resolve(
                    &candidates,
                    target,
                    name,
                    &referrer_prefix,
                ) {
                    Ok(Some(new_name)) => *name = new_name,
                    Ok(None) => {}
                    Err(names) => diagnostics.record(
                        DiagnosticKind::AmbiguousNameReference,
                        referrer_id.clone(),
                        format!(
                            "{target} '{name}' could refer to any of: {}",
                            names.join(", ")
                        ),
                    ),
                };

                for spec in &back_ref.field_specs {
                    mutate_resource(referrer, spec, &mut |value| match value {
                        Value::String(name) => {
                            rewrite(name);
                            Ok(())
                        }
                        Value::Array(items) => {
                            for item in items {
                                match item {
                                    Value::String(name) => rewrite(name),
                                    other => {
                                        return Err(invalid_value(format!(
                                            "name reference must be a string, found {other}"
                                        )));
                                    }
                                }
                            }
                            Ok(())
                        }
                        other => Err(invalid_value(format!(
                            "name reference must be a string, found {other}"
                        ))),
                    })?;
                }
            }
        }
        Ok(())
    }
}
