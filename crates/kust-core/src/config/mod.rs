//! Transformer configuration
//!
//! Declares, per kind, which fields the cross-cutting transformers touch:
//! where prefixes, namespaces, labels and annotations go, which fields name
//! other resources, and which fields may contain `$(VAR)` references.
//!
//! The built-in rules live in `defaults.yaml`. CRD registration and
//! `--transformer-config` files contribute more, combined with
//! [`TransformerConfig::merge`].

use crate::{Result, ResultExt};
use kust_fs::Loader;
use kust_resource::Gvk;
use serde::{Deserialize, Serialize};

const BUILTIN: &str = include_str!("defaults.yaml");

/// A field location, restricted to resources whose gvk it selects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldSpec {
    #[serde(flatten)]
    pub gvk: Gvk,
    /// `/`-separated path, e.g. `spec/template/metadata/labels`
    pub path: String,
    /// Create missing fields along the path
    #[serde(default, rename = "create", skip_serializing_if = "std::ops::Not::not")]
    pub create_if_not_present: bool,
}

impl FieldSpec {
    pub fn new(gvk: Gvk, path: impl Into<String>, create: bool) -> Self {
        Self {
            gvk,
            path: path.into(),
            create_if_not_present: create,
        }
    }

    pub fn applies_to(&self, gvk: &Gvk) -> bool {
        gvk.is_selected(&self.gvk)
    }

    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// Fields in other resources that hold the name of a resource of `gvk`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameBackReferences {
    #[serde(flatten)]
    pub gvk: Gvk,
    #[serde(default, rename = "fieldSpecs")]
    pub field_specs: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TransformerConfig {
    #[serde(default)]
    pub name_prefix: Vec<FieldSpec>,
    #[serde(default)]
    pub namespace: Vec<FieldSpec>,
    #[serde(default)]
    pub common_labels: Vec<FieldSpec>,
    #[serde(default)]
    pub common_annotations: Vec<FieldSpec>,
    #[serde(default)]
    pub name_reference: Vec<NameBackReferences>,
    #[serde(default)]
    pub var_reference: Vec<FieldSpec>,
}

impl TransformerConfig {
    /// The built-in rules.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN.as_bytes()).context("parsing built-in transformer config")
    }

    pub fn from_yaml(bytes: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }

    /// Union of the configs in `paths`, in place of the built-in rules.
    pub fn from_files(loader: &dyn Loader, paths: &[String]) -> Result<Self> {
        paths.iter().try_fold(Self::default(), |acc, path| {
            let bytes = loader.load(path).with_context(|| format!("loading {path}"))?;
            let config = Self::from_yaml(&bytes).with_context(|| format!("parsing {path}"))?;
            tracing::debug!(%path, "Loaded transformer config");
            Ok(acc.merge(&config))
        })
    }

    /// Set union of both rule sets. Order is kept, duplicates are dropped.
    pub fn merge(&self, other: &Self) -> Self {
        let mut name_reference = self.name_reference.clone();
        for incoming in &other.name_reference {
            match name_reference.iter_mut().find(|r| r.gvk == incoming.gvk) {
                Some(existing) => union_into(&mut existing.field_specs, &incoming.field_specs),
                None => name_reference.push(incoming.clone()),
            }
        }

        Self {
            name_prefix: union(&self.name_prefix, &other.name_prefix),
            namespace: union(&self.namespace, &other.namespace),
            common_labels: union(&self.common_labels, &other.common_labels),
            common_annotations: union(&self.common_annotations, &other.common_annotations),
            name_reference,
            var_reference: union(&self.var_reference, &other.var_reference),
        }
    }
}

fn union(a: &[FieldSpec], b: &[FieldSpec]) -> Vec<FieldSpec> {
    let mut out = a.to_vec();
    union_into(&mut out, b);
    out
}

fn union_into(target: &mut Vec<FieldSpec>, extra: &[FieldSpec]) {
    for spec in extra {
        if !target.contains(spec) {
            target.push(spec.clone());
        }
    }
}
