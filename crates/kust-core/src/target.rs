//! Recursive resolution of a kustomization hierarchy
//!
//! A [`KustTarget`] owns one kustomization directory. Loading a level
//! resolves its bases depth-first, gathers raw resources, CRD rules,
//! generated resources and patches, then runs the level's transformer
//! pipeline. Only the outermost target stabilizes names and resolves
//! references, once the whole hierarchy is assembled.

use crate::config::TransformerConfig;
use crate::crds::register_crds;
use crate::generators::{configmaps_from_args, secrets_from_args};
use crate::kustomization::{Kustomization, PatchTarget, Var};
use crate::patch::json_patch::{self, Operation};
use crate::transformers::{
    ImageTagTransformer, MapTransformer, MultiTransformer, NameHashTransformer,
    NamePrefixTransformer, NameReferenceTransformer, NamespaceTransformer,
    PatchJson6902Transformer, PatchTransformer, RefVarTransformer, Transformer,
};
use crate::{DiagnosticKind, Diagnostics, Error, ErrorList, Result, ResultExt};
use kust_fs::{KustomizationFile, Loader};
use kust_resource::{ResMap, Resource};
use std::collections::BTreeMap;

/// The outcome of a successful build.
#[derive(Debug)]
pub struct Build {
    /// Fully resolved resources, in output order
    pub resources: ResMap,
    /// Non-fatal anomalies met while resolving references
    pub diagnostics: Diagnostics,
}

/// What one level hands to its parent.
#[derive(Debug)]
struct Level {
    resources: ResMap,
    /// Every var declared at or below this level, children first
    vars: Vec<Var>,
    /// Inherited rules plus everything registered at or below this level
    config: TransformerConfig,
    diagnostics: Diagnostics,
}

/// One kustomization directory under resolution.
#[derive(Debug)]
pub struct KustTarget {
    kustomization: Kustomization,
    loader: Box<dyn Loader>,
    config: TransformerConfig,
}

impl KustTarget {
    /// Read the manifest at the loader's root.
    ///
    /// The accepted manifest names are tried in order; the first one present
    /// is used.
    pub fn new(loader: Box<dyn Loader>, config: TransformerConfig) -> Result<Self> {
        let kustomization = read_manifest(loader.as_ref())?;
        Ok(Self {
            kustomization,
            loader,
            config,
        })
    }

    pub fn kustomization(&self) -> &Kustomization {
        &self.kustomization
    }

    /// Resolve the hierarchy rooted here and run the reference passes.
    pub fn make_customized_resmap(self) -> Result<Build> {
        let Level {
            mut resources,
            vars,
            config,
            mut diagnostics,
        } = self.load_level()?;

        NameHashTransformer.transform(&mut resources, &mut diagnostics)?;
        NameReferenceTransformer::new(config.name_reference.clone())
            .transform(&mut resources, &mut diagnostics)?;

        let values = resolve_vars(&resources, &vars, &mut diagnostics)?;
        RefVarTransformer::new(values, config.var_reference.clone())
            .transform(&mut resources, &mut diagnostics)?;

        tracing::debug!(
            resources = resources.len(),
            diagnostics = diagnostics.len(),
            "Build complete"
        );
        Ok(Build {
            resources,
            diagnostics,
        })
    }

    fn load_level(self) -> Result<Level> {
        let root = self.loader.root().clone();
        tracing::debug!(%root, "Loading level");

        let mut errors = ErrorList::new();
        let mut config = self.config.clone();
        let mut vars = Vec::new();
        let mut diagnostics = Diagnostics::new();
        let mut inherited = Vec::new();
        let mut local = Vec::new();

        for base in &self.kustomization.bases {
            if let Some(level) = errors.collect(self.load_base(base)) {
                config = config.merge(&level.config);
                vars.extend(level.vars);
                diagnostics.extend(level.diagnostics);
                inherited.push(level.resources);
            }
        }

        for path in &self.kustomization.resources {
            if let Some(resources) = errors.collect(self.load_resources(path, "resource")) {
                local.push(resources);
            }
        }
        // A level's own resources come ahead of everything it inherits
        let accumulated = errors.collect(
            ResMap::merge_without_override(local.into_iter().chain(inherited))
                .context("merging bases and resources"),
        );

        let (crd_config, crd_errors) = register_crds(self.loader.as_ref(), &self.kustomization.crds);
        errors.extend(crd_errors);
        config = config.merge(&crd_config);

        let generated = errors.collect(self.generate());
        let patches = self.load_patches(&mut errors);
        errors.into_result()?;

        // Every collected value is present once the list came back empty
        let mut resources = ResMap::merge_with_override(
            accumulated.unwrap_or_default(),
            generated.unwrap_or_default(),
        )?;

        let json_patches = self.load_json_patches()?;
        let k = &self.kustomization;
        let transformers: Vec<Box<dyn Transformer>> = vec![
            Box::new(PatchTransformer::new(patches)),
            Box::new(NamespaceTransformer::new(&k.namespace, config.namespace.clone())),
            Box::new(NamePrefixTransformer::new(&k.name_prefix, config.name_prefix.clone())),
            Box::new(MapTransformer::labels(
                k.common_labels.clone(),
                config.common_labels.clone(),
            )),
            Box::new(MapTransformer::annotations(
                k.common_annotations.clone(),
                config.common_annotations.clone(),
            )),
            Box::new(PatchJson6902Transformer::new(json_patches)),
            Box::new(ImageTagTransformer::new(k.image_tags.clone())),
        ];
        MultiTransformer::new(transformers).transform(&mut resources, &mut diagnostics)?;

        vars.extend(k.vars.iter().cloned());
        tracing::debug!(%root, resources = resources.len(), "Level resolved");
        Ok(Level {
            resources,
            vars,
            config,
            diagnostics,
        })
    }

    fn load_base(&self, path: &str) -> Result<Level> {
        let resolve = || -> Result<Level> {
            let loader = self.loader.child(path)?;
            KustTarget::new(loader, self.config.clone())?.load_level()
        };
        resolve().with_context(|| format!("base '{path}'"))
    }

    fn load_resources(&self, path: &str, what: &str) -> Result<ResMap> {
        let load = || -> Result<ResMap> {
            let bytes = self.loader.load(path)?;
            Ok(ResMap::from_bytes(&bytes)?)
        };
        load().with_context(|| format!("{what} '{path}'"))
    }

    /// ConfigMaps and Secrets together, duplicates across both rejected.
    fn generate(&self) -> Result<ResMap> {
        let k = &self.kustomization;
        let options = k.generator_options.as_ref();
        let loader = self.loader.as_ref();
        let configmaps = configmaps_from_args(loader, &k.config_map_generator, options)
            .context("configMapGenerator")?;
        let secrets =
            secrets_from_args(loader, &k.secret_generator, options).context("secretGenerator")?;
        ResMap::merge_without_override([configmaps, secrets]).context("merging generated resources")
    }

    /// Strategic merge patch documents, each failing file recorded separately.
    fn load_patches(&self, errors: &mut ErrorList) -> Vec<Resource> {
        self.kustomization
            .strategic_merge_patches()
            .iter()
            .filter_map(|path| errors.collect(self.load_resources(path, "patch")))
            .flatten()
            .collect()
    }

    fn load_json_patches(&self) -> Result<Vec<(PatchTarget, Vec<Operation>)>> {
        self.kustomization
            .patches_json6902
            .iter()
            .map(|patch| {
                let bytes = self
                    .loader
                    .load(&patch.path)
                    .with_context(|| format!("json patch '{}'", patch.path))?;
                let operations = json_patch::parse_operations(&bytes)
                    .with_context(|| format!("json patch '{}'", patch.path))?;
                Ok((patch.target.clone(), operations))
            })
            .collect()
    }
}

fn read_manifest(loader: &dyn Loader) -> Result<Kustomization> {
    for file in KustomizationFile::ALL {
        let bytes = match loader.load(file.as_str()) {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e.into()),
        };
        return Kustomization::from_yaml(&bytes).map_err(|source| Error::Manifest {
            path: loader.root().join(file.as_str()).to_string(),
            source,
        });
    }
    Err(Error::ManifestNotFound {
        root: loader.root().to_string(),
    })
}

/// Read the value of every var from the assembled collection.
///
/// A var whose object cannot be found, or is found more than once, is
/// recorded and skipped. A var whose field cannot be read fails the build.
fn resolve_vars(
    resources: &ResMap,
    vars: &[Var],
    diagnostics: &mut Diagnostics,
) -> Result<BTreeMap<String, String>> {
    let mut values = BTreeMap::new();
    for var in vars {
        let id = var.objref.id();
        let target = match resources.demand_one_match(&id) {
            Ok(Some(target)) => target,
            Ok(None) => {
                diagnostics.record(
                    DiagnosticKind::UnresolvedVar,
                    id,
                    format!("var '{}' refers to a missing resource", var.name),
                );
                continue;
            }
            Err(e) => {
                diagnostics.record(
                    DiagnosticKind::AmbiguousVar,
                    id,
                    format!("var '{}': {e}", var.name),
                );
                continue;
            }
        };
        let value = target
            .get_field_value(var.field_path())
            .map_err(|source| Error::VarFieldPath {
                name: var.name.clone(),
                source,
            })?;
        tracing::debug!(var = %var.name, %value, "Resolved var");
        values.insert(var.name.clone(), value);
    }
    Ok(values)
}
