use super::Transformer;
use crate::kustomization::PatchTarget;
use crate::patch::json_patch::{self, Operation};
use crate::{Diagnostics, Error, Result};
use kust_resource::{ResMap, Resource};

/// Applies RFC 6902 operation lists to explicitly targeted resources.
#[derive(Debug, Default)]
pub struct PatchJson6902Transformer {
    patches: Vec<(PatchTarget, Vec<Operation>)>,
}

impl PatchJson6902Transformer {
    pub fn new(patches: Vec<(PatchTarget, Vec<Operation>)>) -> Self {
        Self { patches }
    }
}

fn in_namespace(resource: &Resource, namespace: Option<&str>) -> bool {
    namespace.is_none_or(|ns| resource.namespace().unwrap_or_default() == ns)
}

impl Transformer for PatchJson6902Transformer {
    fn transform(&self, resources: &mut ResMap, _diagnostics: &mut Diagnostics) -> Result<()> {
        for (target, operations) in &self.patches {
            let partial = target.id();
            let matches: Vec<_> = resources
                .find_matching(&partial)
                .into_iter()
                .filter(|r| in_namespace(r, target.namespace.as_deref()))
                .map(Resource::id)
                .collect();

            let id = match matches.as_slice() {
                [one] => one.clone(),
                [] => {
                    return Err(Error::PatchTarget {
                        target: partial.to_string(),
                        reason: "no matching resource for JSON patch".to_string(),
                    });
                }
                many => {
                    return Err(Error::PatchTarget {
                        target: partial.to_string(),
                        reason: format!("JSON patch matches {} resources", many.len()),
                    });
                }
            };

            let Some(resource) = resources.get_mut(&id) else {
                continue;
            };
            let mut object = resource.object().clone();
            json_patch::apply(&mut object, operations)
                .map_err(|e| e.context(format!("JSON patch on {id}")))?;
            resource.set_object(object)?;
            tracing::debug!(%id, ops = operations.len(), "Applied JSON patch");
        }
        Ok(())
    }
}
