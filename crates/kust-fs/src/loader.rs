//! Loading content relative to a kustomization root
//!
//! Every kustomization directory gets its own [`Loader`]. Bases get child
//! loaders rooted at their own directory (or at a fresh git checkout for
//! remote bases). Cleanup is scoped: dropping a loader releases whatever it
//! acquired, on success and error paths alike.

use crate::remote::{self, RemoteCheckout, RemoteSpec};
use crate::{Error, FileSystem, NormalizedPath, RealFileSystem, Result};
use std::sync::Arc;

/// Reads files relative to a root and creates loaders for sub-roots.
pub trait Loader: std::fmt::Debug {
    /// The directory this loader resolves relative locations against.
    fn root(&self) -> &NormalizedPath;

    /// Read the file at `location`.
    ///
    /// Relative locations are resolved against [`Loader::root`]. A missing
    /// file yields [`Error::NotFound`].
    fn load(&self, location: &str) -> Result<Vec<u8>>;

    /// Create a loader rooted at `location`, a local directory or remote base.
    fn child(&self, location: &str) -> Result<Box<dyn Loader>>;

    /// Check whether `location` names a directory under this loader.
    fn is_dir(&self, location: &str) -> bool;

    /// List the entries of the directory at `location`.
    fn read_dir(&self, location: &str) -> Result<Vec<NormalizedPath>>;
}

/// Loader over a [`FileSystem`].
#[derive(Debug)]
pub struct FileLoader {
    root: NormalizedPath,
    fs: Arc<dyn FileSystem>,
    /// Roots of every loader above this one, for cycle detection
    ancestors: Vec<NormalizedPath>,
    /// Held only by loaders that own a remote clone
    checkout: Option<RemoteCheckout>,
}

impl FileLoader {
    /// Create a root loader for `location`.
    ///
    /// Remote locations are cloned into a temporary directory that lives as
    /// long as the loader.
    pub fn new(location: &str, fs: Arc<dyn FileSystem>) -> Result<Self> {
        if remote::is_remote(location) {
            return Self::from_remote(&RemoteSpec::parse(location)?, Vec::new());
        }
        let root = Self::local_root(fs.as_ref(), NormalizedPath::new(location))?;
        tracing::debug!(%root, "Created root loader");
        Ok(Self {
            root,
            fs,
            ancestors: Vec::new(),
            checkout: None,
        })
    }

    fn from_remote(spec: &RemoteSpec, ancestors: Vec<NormalizedPath>) -> Result<Self> {
        let (checkout, root) = remote::checkout(spec)?;
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
        if !fs.is_dir(&root) {
            return Err(Error::NotADirectory {
                path: root.to_native(),
            });
        }
        Ok(Self {
            root,
            fs,
            ancestors,
            checkout: Some(checkout),
        })
    }

    fn local_root(fs: &dyn FileSystem, candidate: NormalizedPath) -> Result<NormalizedPath> {
        let root = fs.canonicalize(&candidate.clean())?;
        if !fs.is_dir(&root) {
            return Err(Error::NotADirectory {
                path: root.to_native(),
            });
        }
        Ok(root)
    }

    fn resolve(&self, location: &str) -> NormalizedPath {
        self.root.join(location).clean()
    }

    /// True when this loader owns a remote checkout.
    pub fn is_remote(&self) -> bool {
        self.checkout.is_some()
    }
}

impl Loader for FileLoader {
    fn root(&self) -> &NormalizedPath {
        &self.root
    }

    fn load(&self, location: &str) -> Result<Vec<u8>> {
        self.fs.read_file(&self.resolve(location))
    }

    fn child(&self, location: &str) -> Result<Box<dyn Loader>> {
        let mut ancestors = self.ancestors.clone();
        ancestors.push(self.root.clone());

        if remote::is_remote(location) {
            let loader = Self::from_remote(&RemoteSpec::parse(location)?, ancestors)?;
            return Ok(Box::new(loader));
        }

        let root = Self::local_root(self.fs.as_ref(), self.resolve(location))?;
        if ancestors.contains(&root) {
            return Err(Error::Cycle {
                path: root.to_native(),
            });
        }

        tracing::debug!(parent = %self.root, %root, "Created child loader");
        Ok(Box::new(Self {
            root,
            fs: Arc::clone(&self.fs),
            ancestors,
            checkout: None,
        }))
    }

    fn is_dir(&self, location: &str) -> bool {
        self.fs.is_dir(&self.resolve(location))
    }

    fn read_dir(&self, location: &str) -> Result<Vec<NormalizedPath>> {
        self.fs.read_dir(&self.resolve(location))
    }
}
