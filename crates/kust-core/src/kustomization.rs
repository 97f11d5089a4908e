//! The kustomization manifest
//!
//! Parsed strictly: unknown fields and type mismatches are errors, since a
//! misspelled field would otherwise be silently ignored.

use kust_resource::{Gvk, ResId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_VAR_FIELD_PATH: &str = "metadata.name";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Kustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Directories (or remote repositories) holding inherited kustomizations
    #[serde(default)]
    pub bases: Vec<String>,
    /// Files of raw resource documents
    #[serde(default)]
    pub resources: Vec<String>,
    /// OpenAPI definition files for custom kinds
    #[serde(default)]
    pub crds: Vec<String>,

    #[serde(default)]
    pub config_map_generator: Vec<GeneratorArgs>,
    #[serde(default)]
    pub secret_generator: Vec<GeneratorArgs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_options: Option<GeneratorOptions>,

    #[serde(default)]
    pub patches_strategic_merge: Vec<String>,
    /// Older spelling of `patchesStrategicMerge`
    #[serde(default)]
    pub patches: Vec<String>,
    #[serde(default, rename = "patchesJson6902")]
    pub patches_json6902: Vec<PatchJson6902>,

    #[serde(default)]
    pub name_prefix: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub common_labels: BTreeMap<String, String>,
    #[serde(default)]
    pub common_annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub image_tags: Vec<ImageTag>,
    #[serde(default)]
    pub vars: Vec<Var>,
}

impl Kustomization {
    /// Parse a manifest. An empty file is an empty kustomization.
    pub fn from_yaml(bytes: &[u8]) -> serde_yaml::Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(bytes)
    }

    /// `patchesStrategicMerge` followed by `patches`.
    pub fn strategic_merge_patches(&self) -> Vec<String> {
        self.patches_strategic_merge
            .iter()
            .chain(&self.patches)
            .cloned()
            .collect()
    }
}

/// Input for one generated ConfigMap or Secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorArgs {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    /// `key=value` pairs
    #[serde(default)]
    pub literals: Vec<String>,
    /// `path` or `key=path`
    #[serde(default)]
    pub files: Vec<String>,
    /// A file of `key=value` lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Secret type; only valid in `secretGenerator`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratorOptions {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub disable_name_suffix_hash: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchJson6902 {
    pub target: PatchTarget,
    pub path: String,
}

/// Selects the single resource a JSON patch applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchTarget {
    #[serde(default)]
    pub group: String,
    pub version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl PatchTarget {
    pub fn id(&self) -> ResId {
        ResId::new(
            Gvk::new(&self.group, &self.version, &self.kind),
            &self.name,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageTag {
    pub name: String,
    #[serde(default)]
    pub new_tag: String,
    #[serde(default)]
    pub digest: String,
}

/// A named reference to a field of another resource, substituted as `$(NAME)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Var {
    pub name: String,
    pub objref: ObjectRef,
    #[serde(default)]
    pub fieldref: FieldRef,
}

impl Var {
    /// The referenced field, `metadata.name` when not given.
    pub fn field_path(&self) -> &str {
        if self.fieldref.fieldpath.is_empty() {
            DEFAULT_VAR_FIELD_PATH
        } else {
            &self.fieldref.fieldpath
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ObjectRef {
    #[serde(default)]
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ObjectRef {
    pub fn id(&self) -> ResId {
        ResId::new(Gvk::from_api_version(&self.api_version, &self.kind), &self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldRef {
    #[serde(default)]
    pub fieldpath: String,
}
