//! Well-known file names.

use std::path::Path;

/// Accepted names for the manifest at the root of every kustomization directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KustomizationFile {
    /// `kustomization.yaml`
    Yaml,
    /// `kustomization.yml`
    Yml,
    /// `Kustomization`
    Bare,
}

impl KustomizationFile {
    /// Lookup order used when loading a kustomization directory.
    pub const ALL: [KustomizationFile; 3] = [Self::Yaml, Self::Yml, Self::Bare];

    /// Get the string representation of the file name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yaml => "kustomization.yaml",
            Self::Yml => "kustomization.yml",
            Self::Bare => "Kustomization",
        }
    }
}

impl AsRef<Path> for KustomizationFile {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for KustomizationFile {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for KustomizationFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
