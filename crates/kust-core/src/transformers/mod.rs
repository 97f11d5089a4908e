//! Transformers that edit a collection in place
//!
//! Each level of a build runs, in order: [`PatchTransformer`],
//! [`NamespaceTransformer`], [`NamePrefixTransformer`], the label and
//! annotation [`MapTransformer`]s, [`PatchJson6902Transformer`] and
//! [`ImageTagTransformer`]. The top level then runs
//! [`NameHashTransformer`], [`NameReferenceTransformer`] and
//! [`RefVarTransformer`].

mod image_tag;
mod json6902;
mod map;
pub mod mutate;
mod name_hash;
mod name_reference;
mod namespace;
mod patch;
mod prefix;
mod refvar;

pub use image_tag::ImageTagTransformer;
pub use json6902::PatchJson6902Transformer;
pub use map::MapTransformer;
pub use name_hash::NameHashTransformer;
pub use name_reference::NameReferenceTransformer;
pub use namespace::NamespaceTransformer;
pub use patch::PatchTransformer;
pub use prefix::NamePrefixTransformer;
pub use refvar::{RefVarTransformer, expand};

use crate::{Diagnostics, Result};
use kust_resource::ResMap;

/// An in-place edit of a resource collection.
pub trait Transformer: std::fmt::Debug {
    fn transform(&self, resources: &mut ResMap, diagnostics: &mut Diagnostics) -> Result<()>;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

/// Runs transformers in sequence, stopping at the first failure.
///
/// The failing transformer's error is returned as is.
#[derive(Debug, Default)]
pub struct MultiTransformer {
    transformers: Vec<Box<dyn Transformer>>,
}

impl MultiTransformer {
    pub fn new(transformers: Vec<Box<dyn Transformer>>) -> Self {
        Self { transformers }
    }
}

impl Transformer for MultiTransformer {
    fn transform(&self, resources: &mut ResMap, diagnostics: &mut Diagnostics) -> Result<()> {
        for transformer in &self.transformers {
            tracing::debug!(transformer = transformer.name(), "Running transformer");
            transformer.transform(resources, diagnostics)?;
        }
        Ok(())
    }
}
