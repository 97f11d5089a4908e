use super::Transformer;
use super::mutate::mutate_resource;
use crate::config::FieldSpec;
use crate::{Diagnostics, Result};
use kust_resource::ResMap;
use serde_json::Value;
use std::collections::BTreeSet;

const BINDING_KINDS: [&str; 2] = ["RoleBinding", "ClusterRoleBinding"];

/// Places every namespaced resource in one namespace.
///
/// Cluster-scoped kinds are left alone. Binding subjects that name a
/// ServiceAccount from the collection follow it into the namespace. Subjects
/// keep declared names until the top-level reference pass, so they are
/// matched against each account's original name.
#[derive(Debug)]
pub struct NamespaceTransformer {
    namespace: String,
    field_specs: Vec<FieldSpec>,
}

impl NamespaceTransformer {
    pub fn new(namespace: impl Into<String>, field_specs: Vec<FieldSpec>) -> Self {
        Self {
            namespace: namespace.into(),
            field_specs,
        }
    }

    fn update_subjects(&self, resources: &mut ResMap) {
        let service_accounts: BTreeSet<String> = resources
            .resources()
            .filter(|r| r.kind() == "ServiceAccount")
            .map(|r| r.original_name().to_string())
            .collect();
        if service_accounts.is_empty() {
            return;
        }

        for binding in resources
            .resources_mut()
            .filter(|r| BINDING_KINDS.contains(&r.kind()))
        {
            let Some(Value::Array(subjects)) = binding.object_mut().get_mut("subjects") else {
                continue;
            };
            for subject in subjects.iter_mut().filter_map(Value::as_object_mut) {
                let is_known_account = subject.get("kind").and_then(Value::as_str)
                    == Some("ServiceAccount")
                    && subject
                        .get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|name| service_accounts.contains(name));
                if is_known_account {
                    subject.insert(
                        "namespace".to_string(),
                        Value::String(self.namespace.clone()),
                    );
                }
            }
        }
    }
}

impl Transformer for NamespaceTransformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        if self.namespace.is_empty() {
            return Ok(());
        }

        for resource in resources.resources_mut() {
            if resource.gvk().is_cluster_scoped() {
                continue;
            }
            for spec in &self.field_specs {
                mutate_resource(resource, spec, &mut |value| {
                    *value = Value::String(self.namespace.clone());
                    Ok(())
                })?;
            }
        }

        self.update_subjects(resources);
        Ok(())
    }
}
