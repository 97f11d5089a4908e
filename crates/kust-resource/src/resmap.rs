//! Identity-keyed resource collections

use crate::{Error, ResId, Resource, Result, codec};
use indexmap::IndexMap;
use serde_json::Value;

/// An insertion-ordered collection holding at most one resource per id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResMap {
    entries: IndexMap<ResId, Resource>,
}

impl ResMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from resources, rejecting duplicate ids.
    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Result<Self> {
        let mut map = Self::new();
        for resource in resources {
            map.insert(resource)?;
        }
        Ok(map)
    }

    /// Decode every document in `bytes` into a collection.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let resources = codec::decode_documents(bytes)?
            .into_iter()
            .map(Resource::from_value)
            .collect::<Result<Vec<_>>>()?;
        Self::from_resources(resources)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a resource. An existing entry with the same id is an error.
    pub fn insert(&mut self, resource: Resource) -> Result<()> {
        let id = resource.id();
        if self.entries.contains_key(&id) {
            return Err(Error::DuplicateId { id: id.to_string() });
        }
        self.entries.insert(id, resource);
        Ok(())
    }

    pub fn get(&self, id: &ResId) -> Option<&Resource> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ResId) -> Option<&mut Resource> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &ResId) -> bool {
        self.entries.contains_key(id)
    }

    /// Remove a resource, keeping the order of the rest.
    pub fn remove(&mut self, id: &ResId) -> Option<Resource> {
        self.entries.shift_remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResId> {
        self.entries.keys()
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entries.values()
    }

    pub fn resources_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.entries.values_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResId, &Resource)> {
        self.entries.iter()
    }

    /// Concatenate collections in order. Any id present in two inputs is an
    /// error, even when both documents are identical.
    pub fn merge_without_override(maps: impl IntoIterator<Item = ResMap>) -> Result<ResMap> {
        let mut merged = ResMap::new();
        for map in maps {
            for (id, resource) in map.entries {
                if merged.entries.contains_key(&id) {
                    return Err(Error::DuplicateId { id: id.to_string() });
                }
                merged.entries.insert(id, resource);
            }
        }
        Ok(merged)
    }

    /// Lay `overlay` over `base`: shared ids take the overlay's document in
    /// the base's position, new ids are appended.
    pub fn merge_with_override(base: ResMap, overlay: ResMap) -> Result<ResMap> {
        let mut merged = base;
        for (id, resource) in overlay.entries {
            if id.name.is_empty() {
                return Err(Error::MissingName { id: id.to_string() });
            }
            if merged.entries.insert(id.clone(), resource).is_some() {
                tracing::debug!(%id, "Overriding resource");
            }
        }
        Ok(merged)
    }

    /// Every resource whose id matches the partial id.
    pub fn find_matching(&self, partial: &ResId) -> Vec<&Resource> {
        self.entries
            .iter()
            .filter(|(id, _)| id.matches(partial))
            .map(|(_, resource)| resource)
            .collect()
    }

    /// The single resource matching `partial`, if any.
    ///
    /// More than one match is reported rather than resolved arbitrarily.
    pub fn demand_one_match(&self, partial: &ResId) -> Result<Option<&Resource>> {
        match self.find_matching(partial).as_slice() {
            [] => Ok(None),
            [one] => Ok(Some(*one)),
            many => Err(Error::Ambiguous {
                id: partial.to_string(),
                candidates: many.iter().map(|r| r.id().to_string()).collect(),
            }),
        }
    }

    /// Recompute every key after identity-changing edits.
    pub fn rekey(&mut self) -> Result<()> {
        let entries = std::mem::take(&mut self.entries);
        for (_, resource) in entries {
            self.insert(resource)?;
        }
        Ok(())
    }

    /// Documents in insertion order.
    pub fn to_values(&self) -> Vec<Value> {
        self.entries.values().map(|r| r.object().clone()).collect()
    }

    /// Render as a multi-document YAML stream.
    pub fn encode_as_yaml(&self) -> Result<Vec<u8>> {
        codec::encode_documents(&self.to_values())
    }
}

impl IntoIterator for ResMap {
    type Item = Resource;
    type IntoIter = indexmap::map::IntoValues<ResId, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}
