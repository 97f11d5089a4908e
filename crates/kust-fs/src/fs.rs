//! The filesystem seam underneath every loader
//!
//! [`RealFileSystem`] talks to disk; [`MemoryFileSystem`] keeps a whole
//! directory tree in memory so resolver tests can build hierarchies
//! without touching disk.

use crate::{Error, NormalizedPath, Result, io};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::sync::{Mutex, MutexGuard};

/// Minimal filesystem operations needed to load and write kustomizations.
pub trait FileSystem: Send + Sync + std::fmt::Debug {
    /// Read the full contents of a file.
    fn read_file(&self, path: &NormalizedPath) -> Result<Vec<u8>>;

    /// Replace the contents of a file, creating parent directories.
    fn write_file(&self, path: &NormalizedPath, content: &[u8]) -> Result<()>;

    /// Check whether a file or directory exists.
    fn exists(&self, path: &NormalizedPath) -> bool;

    /// Check whether the path is a directory.
    fn is_dir(&self, path: &NormalizedPath) -> bool;

    /// List the immediate entries of a directory, sorted by path.
    fn read_dir(&self, path: &NormalizedPath) -> Result<Vec<NormalizedPath>>;

    /// Resolve a path to the canonical form used for cycle detection.
    fn canonicalize(&self, path: &NormalizedPath) -> Result<NormalizedPath>;
}

/// The host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFileSystem {
    fn read_file(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        let native = path.to_native();
        fs::read(&native).map_err(|e| Error::io(native, e))
    }

    fn write_file(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        io::write_atomic(path, content)
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        path.to_native().exists()
    }

    fn is_dir(&self, path: &NormalizedPath) -> bool {
        path.to_native().is_dir()
    }

    fn read_dir(&self, path: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
        let native = path.to_native();
        let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            paths.push(NormalizedPath::new(entry.path()));
        }
        paths.sort();
        Ok(paths)
    }

    fn canonicalize(&self, path: &NormalizedPath) -> Result<NormalizedPath> {
        let native = path.to_native();
        dunce::canonicalize(&native)
            .map(NormalizedPath::new)
            .map_err(|e| Error::io(native, e))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<NormalizedPath, Vec<u8>>,
    dirs: BTreeSet<NormalizedPath>,
}

impl MemoryState {
    fn register_parents(&mut self, path: &NormalizedPath) {
        let mut current = path.parent();
        while let Some(dir) = current {
            current = dir.parent();
            self.dirs.insert(dir);
        }
    }
}

/// An in-memory filesystem.
///
/// Paths are cleaned lexically on every access, so `/app/a/../b` and
/// `/app/b` name the same entry. Directories exist either explicitly via
/// [`MemoryFileSystem::mkdir`] or implicitly as the parent of a file.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    state: Mutex<MemoryState>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // Single-threaded builds never poison the lock; recover if a test panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a file, creating its parent directories.
    pub fn add_file(&self, path: impl Into<NormalizedPath>, content: impl AsRef<[u8]>) {
        let path = path.into().clean();
        let mut state = self.state();
        state.register_parents(&path);
        state.files.insert(path, content.as_ref().to_vec());
    }

    /// Create an empty directory and its parents.
    pub fn mkdir(&self, path: impl Into<NormalizedPath>) {
        let path = path.into().clean();
        let mut state = self.state();
        state.register_parents(&path);
        state.dirs.insert(path);
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &NormalizedPath) -> Result<Vec<u8>> {
        let path = path.clean();
        self.state()
            .files
            .get(&path)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                path: path.to_native(),
            })
    }

    fn write_file(&self, path: &NormalizedPath, content: &[u8]) -> Result<()> {
        self.add_file(path.clone(), content);
        Ok(())
    }

    fn exists(&self, path: &NormalizedPath) -> bool {
        let path = path.clean();
        let state = self.state();
        state.files.contains_key(&path) || state.dirs.contains(&path)
    }

    fn is_dir(&self, path: &NormalizedPath) -> bool {
        let path = path.clean();
        path.as_str() == "/" || self.state().dirs.contains(&path)
    }

    fn read_dir(&self, path: &NormalizedPath) -> Result<Vec<NormalizedPath>> {
        let dir = path.clean();
        if !self.is_dir(&dir) {
            return Err(Error::NotADirectory {
                path: dir.to_native(),
            });
        }
        let state = self.state();
        let entries: BTreeSet<NormalizedPath> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .filter(|candidate| candidate.parent().as_ref() == Some(&dir))
            .cloned()
            .collect();
        Ok(entries.into_iter().collect())
    }

    fn canonicalize(&self, path: &NormalizedPath) -> Result<NormalizedPath> {
        let path = path.clean();
        if self.exists(&path) || path.as_str() == "/" {
            Ok(path)
        } else {
            Err(Error::NotFound {
                path: path.to_native(),
            })
        }
    }
}
