use super::Transformer;
use crate::patch::strategic;
use crate::{Diagnostics, Error, Result};
use kust_resource::{ResId, ResMap, Resource};

/// Applies strategic-merge patches.
///
/// Each patch names its target by kind and declared name. It is merged into
/// the one resource it matches, and the target keeps its current name.
#[derive(Debug, Default)]
pub struct PatchTransformer {
    patches: Vec<Resource>,
}

impl PatchTransformer {
    pub fn new(patches: Vec<Resource>) -> Self {
        Self { patches }
    }
}

impl Transformer for PatchTransformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        for patch in &self.patches {
            let partial = ResId::new(patch.gvk(), patch.original_name());
            let target_id = match resources.find_matching(&partial).as_slice() {
                [one] => one.id(),
                [] => {
                    return Err(Error::PatchTarget {
                        target: partial.to_string(),
                        reason: "no matching resource".to_string(),
                    });
                }
                many => {
                    return Err(Error::PatchTarget {
                        target: partial.to_string(),
                        reason: format!("matches {} resources", many.len()),
                    });
                }
            };

            let Some(target) = resources.get_mut(&target_id) else {
                continue;
            };
            let name = target.name().to_string();
            let merged = strategic::merge(target.object(), patch.object())?;
            target.set_object(merged)?;
            target.set_name(name);
            tracing::debug!(id = %target_id, "Applied strategic merge patch");
        }
        Ok(())
    }
}
