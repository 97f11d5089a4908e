//! Resource documents

use crate::path::{get_at_path, parse_path};
use crate::{Error, Gvk, ResId, Result};
use serde_json::{Map, Value};

/// A resource document and the bookkeeping needed to track it across renames.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    object: Value,
    /// Name the resource was declared or generated with
    original_name: String,
    /// Every name prefix applied so far, outermost first
    prefix: String,
    /// Generated resources get a content hash appended at the top level
    needs_hash: bool,
}

impl Resource {
    /// Wrap a decoded document.
    ///
    /// The document must be a mapping with a `kind` and a non-empty
    /// `metadata.name`.
    pub fn from_value(object: Value) -> Result<Self> {
        let Value::Object(map) = &object else {
            return Err(Error::invalid(format!(
                "expected a mapping, found {}",
                type_name(&object)
            )));
        };

        let kind = map.get("kind").and_then(Value::as_str).unwrap_or_default();
        if kind.is_empty() {
            return Err(Error::invalid("missing 'kind'"));
        }

        let name = map
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if name.is_empty() {
            return Err(Error::invalid(format!("{kind} is missing 'metadata.name'")));
        }

        Ok(Self {
            object,
            original_name: name,
            prefix: String::new(),
            needs_hash: false,
        })
    }

    /// Wrap a generated document, marking it for name hashing.
    pub fn generated(object: Value, needs_hash: bool) -> Result<Self> {
        let mut resource = Self::from_value(object)?;
        resource.needs_hash = needs_hash;
        Ok(resource)
    }

    pub fn object(&self) -> &Value {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut Value {
        &mut self.object
    }

    /// Replace the whole document, keeping identity bookkeeping.
    pub fn set_object(&mut self, object: Value) -> Result<()> {
        if !object.is_object() {
            return Err(Error::invalid(format!(
                "{} would become {}",
                self.id(),
                type_name(&object)
            )));
        }
        self.object = object;
        Ok(())
    }

    pub fn kind(&self) -> &str {
        self.object
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn gvk(&self) -> Gvk {
        let api_version = self
            .object
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Gvk::from_api_version(api_version, self.kind())
    }

    /// Current `metadata.name`.
    pub fn name(&self) -> &str {
        self.metadata_str("name").unwrap_or_default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        if let Some(metadata) = self.metadata_mut() {
            metadata.insert("name".to_string(), Value::String(name.into()));
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_str("namespace")
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Record a prefix applied on top of any earlier ones.
    pub fn add_prefix(&mut self, prefix: &str) {
        self.prefix.insert_str(0, prefix);
    }

    pub fn needs_hash(&self) -> bool {
        self.needs_hash
    }

    pub fn id(&self) -> ResId {
        ResId::new(self.gvk(), self.original_name.clone()).with_prefix(self.prefix.clone())
    }

    /// Read the scalar at a dotted path (`spec.ports[0].port`) as a string.
    pub fn get_field_value(&self, path: &str) -> Result<String> {
        let value = get_at_path(&self.object, &parse_path(path)).ok_or_else(|| {
            Error::FieldNotFound {
                id: self.id().to_string(),
                path: path.to_string(),
            }
        })?;
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            _ => Err(Error::NotAScalar {
                id: self.id().to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// The mapping at `metadata.<field>`, such as labels.
    pub fn metadata_map(&self, field: &str) -> Option<&Map<String, Value>> {
        self.object.get("metadata")?.get(field)?.as_object()
    }

    fn metadata_str(&self, field: &str) -> Option<&str> {
        self.object.get("metadata")?.get(field)?.as_str()
    }

    fn metadata_mut(&mut self) -> Option<&mut Map<String, Value>> {
        let metadata = self
            .object
            .as_object_mut()?
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if !metadata.is_object() {
            *metadata = Value::Object(Map::new());
        }
        metadata.as_object_mut()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
