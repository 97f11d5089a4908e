//! Resolution engine for kust
//!
//! A kustomization directory names bases to inherit, raw resources to
//! include, generators, patches and cross-cutting edits. This crate turns a
//! tree of such directories into one resolved [`ResMap`]:
//!
//! ```text
//!   overlay ──┬── base A ── (resources, generators, patches, ...)
//!             └── base B ── ...
//!
//!   each level:  bases + resources + generated
//!                  → patch → namespace → prefix → labels → annotations
//!                  → json6902 → image tags
//!   top level:   name hash → vars → name references → $(VAR) expansion
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kust_core::{TransformerConfig, build};
//! use kust_fs::{FileLoader, RealFileSystem};
//!
//! fn example() -> kust_core::Result<()> {
//!     let loader = FileLoader::new("overlays/prod", Arc::new(RealFileSystem::new()))?;
//!     let built = build(Box::new(loader), TransformerConfig::builtin()?)?;
//!     let yaml = built.resources.encode_as_yaml()?;
//!     print!("{}", String::from_utf8_lossy(&yaml));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crds;
pub mod diagnostics;
pub mod error;
pub mod generators;
pub mod kustomization;
pub mod patch;
pub mod target;
pub mod transformers;

pub use config::{FieldSpec, NameBackReferences, TransformerConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, ErrorList, Result, ResultExt};
pub use kustomization::Kustomization;
pub use target::{Build, KustTarget};

pub use kust_resource::{Gvk, ResId, ResMap, Resource};

use kust_fs::Loader;

/// Resolve the kustomization at the loader's root into final resources.
pub fn build(loader: Box<dyn Loader>, config: TransformerConfig) -> Result<Build> {
    tracing::info!(root = %loader.root(), "Building kustomization");
    KustTarget::new(loader, config)?.make_customized_resmap()
}
