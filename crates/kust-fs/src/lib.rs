//! Filesystem abstraction for kust
//!
//! Provides the [`FileSystem`] seam (real and in-memory), lexical path
//! normalization, and the [`Loader`] used to read manifests, resources and
//! patches relative to a kustomization root, including remote git bases.

pub mod constants;
pub mod error;
pub mod fs;
pub mod io;
pub mod loader;
pub mod path;
pub mod remote;

pub use constants::KustomizationFile;
pub use error::{Error, Result};
pub use fs::{FileSystem, MemoryFileSystem, RealFileSystem};
pub use loader::{FileLoader, Loader};
pub use path::NormalizedPath;
pub use remote::{RemoteSpec, is_remote};
