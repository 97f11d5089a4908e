use super::Transformer;
use super::mutate::mutate_resource;
use crate::config::FieldSpec;
use crate::{Diagnostics, Result};
use kust_resource::ResMap;
use serde_json::Value;
use std::collections::BTreeMap;

/// Substitutes `$(NAME)` references with resolved var values.
#[derive(Debug, Default)]
pub struct RefVarTransformer {
    vars: BTreeMap<String, String>,
    field_specs: Vec<FieldSpec>,
}

impl RefVarTransformer {
    pub fn new(vars: BTreeMap<String, String>, field_specs: Vec<FieldSpec>) -> Self {
        Self { vars, field_specs }
    }
}

impl Transformer for RefVarTransformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        if self.vars.is_empty() {
            return Ok(());
        }
        for resource in resources.resources_mut() {
            for spec in &self.field_specs {
                mutate_resource(resource, spec, &mut |value| {
                    match value {
                        Value::String(s) => *s = expand(s, &self.vars),
                        Value::Array(items) => {
                            for item in items {
                                if let Value::String(s) = item {
                                    *s = expand(s, &self.vars);
                                }
                            }
                        }
                        _ => {}
                    }
                    Ok(())
                })?;
            }
        }
        Ok(())
    }
}

/// Expand `$(NAME)` references in `input`.
///
/// `$$` yields a literal `$`. References to unknown names and unterminated
/// references are kept verbatim.
pub fn expand(input: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push('$');
            rest = tail;
        } else if let Some(body) = after.strip_prefix('(') {
            match body.find(')') {
                Some(end) => {
                    let name = &body[..end];
                    match vars.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("$(");
                            out.push_str(name);
                            out.push(')');
                        }
                    }
                    rest = &body[end + 1..];
                }
                None => {
                    out.push_str(&rest[idx..]);
                    rest = "";
                }
            }
        } else {
            out.push('$');
            rest = after;
        }
    }
    out.push_str(rest);
    out
}
