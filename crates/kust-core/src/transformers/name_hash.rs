use super::Transformer;
use crate::{Diagnostics, Result};
use kust_resource::{ResMap, hash};

/// Appends a content hash to the names of generated resources.
#[derive(Debug, Default)]
pub struct NameHashTransformer;

impl Transformer for NameHashTransformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        for resource in resources.resources_mut().filter(|r| r.needs_hash()) {
            let suffix = hash::hash_suffix(resource)?;
            let name = format!("{}-{suffix}", resource.name());
            tracing::debug!(id = %resource.id(), %name, "Hashed generated name");
            resource.set_name(name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kust_resource::Resource;
    use serde_json::json;

    #[test]
    fn only_generated_resources_are_hashed() {
        let generated = Resource::generated(
            json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "cfg"}, "data": {"a": "b"}}),
            true,
        )
        .unwrap();
        let plain = Resource::from_value(
            json!({"apiVersion": "v1", "kind": "ConfigMap", "metadata": {"name": "plain"}}),
        )
        .unwrap();
        let mut map = ResMap::from_resources([generated, plain]).unwrap();

        NameHashTransformer.transform(&mut map, &mut Diagnostics::new()).unwrap();

        let names: Vec<&str> = map.resources().map(Resource::name).collect();
        assert!(names[0].starts_with("cfg-"));
        assert_eq!(names[0].len(), "cfg-".len() + 10);
        assert_eq!(names[1], "plain");
    }
}
