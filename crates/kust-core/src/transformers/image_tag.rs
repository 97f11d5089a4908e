use super::Transformer;
use crate::kustomization::ImageTag;
use crate::{Diagnostics, Result};
use kust_resource::ResMap;
use serde_json::Value;

const CONTAINER_FIELDS: [&str; 2] = ["containers", "initContainers"];

/// Rewrites container images by name.
///
/// Every `containers` and `initContainers` list anywhere in a document is
/// inspected, so pods, workload templates and custom kinds are all covered.
#[derive(Debug, Default)]
pub struct ImageTagTransformer {
    image_tags: Vec<ImageTag>,
}

impl ImageTagTransformer {
    pub fn new(image_tags: Vec<ImageTag>) -> Self {
        Self { image_tags }
    }

    fn rewrite(&self, image: &str) -> Option<String> {
        let name = image_name(image);
        let tag = self.image_tags.iter().rev().find(|t| t.name == name)?;
        if !tag.digest.is_empty() {
            Some(format!("{name}@{}", tag.digest))
        } else if !tag.new_tag.is_empty() {
            Some(format!("{name}:{}", tag.new_tag))
        } else {
            None
        }
    }

    fn walk(&self, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if CONTAINER_FIELDS.contains(&key.as_str()) {
                        self.update_containers(child);
                    }
                    self.walk(child);
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.walk(item)),
            _ => {}
        }
    }

    fn update_containers(&self, containers: &mut Value) {
        let Value::Array(containers) = containers else {
            return;
        };
        for container in containers.iter_mut().filter_map(Value::as_object_mut) {
            let rewritten = container
                .get("image")
                .and_then(Value::as_str)
                .and_then(|image| self.rewrite(image));
            if let Some(image) = rewritten {
                container.insert("image".to_string(), Value::String(image));
            }
        }
    }
}

/// The image reference without its tag or digest.
///
/// A registry port (`registry:5000/app`) is not mistaken for a tag.
fn image_name(image: &str) -> &str {
    let image = image.split_once('@').map_or(image, |(name, _)| name);
    let last_slash = image.rfind('/').map_or(0, |idx| idx + 1);
    match image[last_slash..].rfind(':') {
        Some(idx) => &image[..last_slash + idx],
        None => image,
    }
}

impl Transformer for ImageTagTransformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        if self.image_tags.is_empty() {
            return Ok(());
        }
        for resource in resources.resources_mut() {
            self.walk(resource.object_mut());
        }
        Ok(())
    }
}
