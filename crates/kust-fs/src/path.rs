//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// Kustomization roots and the locations inside manifests are always
/// written with forward slashes, so paths are compared and joined in that
/// form and converted to platform-native format only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// True for `/rooted` paths and Windows drive paths (`C:/...`).
    pub fn is_absolute(&self) -> bool {
        let bytes = self.inner.as_bytes();
        self.inner.starts_with('/')
            || (bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic())
    }

    /// Join this path with a segment.
    ///
    /// An absolute segment replaces the path entirely.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        if Self::new(&segment_normalized).is_absolute() {
            return Self {
                inner: segment_normalized,
            };
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }
    }

    /// Lexically normalize the path.
    ///
    /// Removes `.` components and empty segments, and resolves `..` against
    /// the preceding component. Leading `..` survive on relative paths and
    /// are dropped at the root of absolute ones. Never touches the filesystem.
    pub fn clean(&self) -> Self {
        let absolute = self.inner.starts_with('/');
        let mut parts: Vec<&str> = Vec::new();
        for part in self.inner.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if parts.last().is_some_and(|p| *p != "..") {
                        parts.pop();
                    } else if !absolute {
                        parts.push("..");
                    }
                }
                other => parts.push(other),
            }
        }

        let joined = parts.join("/");
        let inner = if absolute {
            format!("/{joined}")
        } else if joined.is_empty() {
            ".".to_string()
        } else {
            joined
        };
        Self { inner }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) if trimmed.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// True when `other` is this path or lies beneath it.
    pub fn contains(&self, other: &NormalizedPath) -> bool {
        if self.inner == other.inner || self.inner == "/" {
            return other.inner.starts_with(&self.inner);
        }
        other
            .inner
            .strip_prefix(&self.inner)
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_resolves_parent_segments() {
        let path = NormalizedPath::new("/app/overlays/prod/../../base");
        assert_eq!(path.clean().as_str(), "/app/base");
    }

    #[test]
    fn clean_keeps_leading_parents_on_relative_paths() {
        let path = NormalizedPath::new("../shared/./base/");
        assert_eq!(path.clean().as_str(), "../shared/base");
    }

    #[test]
    fn clean_stops_at_filesystem_root() {
        assert_eq!(NormalizedPath::new("/../..").clean().as_str(), "/");
        assert_eq!(NormalizedPath::new("./").clean().as_str(), ".");
    }

    #[test]
    fn join_with_absolute_segment_replaces() {
        let base = NormalizedPath::new("/app/base");
        assert_eq!(base.join("/etc/other").as_str(), "/etc/other");
        assert_eq!(base.join("deploy.yaml").as_str(), "/app/base/deploy.yaml");
    }

    #[test]
    fn contains_requires_component_boundary() {
        let root = NormalizedPath::new("/app/base");
        assert!(root.contains(&NormalizedPath::new("/app/base/x.yaml")));
        assert!(root.contains(&NormalizedPath::new("/app/base")));
        assert!(!root.contains(&NormalizedPath::new("/app/base2")));
    }

    #[test]
    fn windows_style_input_is_normalized() {
        let path = NormalizedPath::new("C:\\work\\overlay");
        assert_eq!(path.as_str(), "C:/work/overlay");
        assert!(path.is_absolute());
    }
}
