//! Error types for kust-core

use std::fmt;

/// Result type for kust-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a kustomization
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// None of the accepted manifest names exist in a directory
    #[error(
        "No kustomization file (kustomization.yaml, kustomization.yml or Kustomization) found in {root}"
    )]
    ManifestNotFound { root: String },

    /// Unknown fields or type mismatches in a manifest
    #[error("Malformed kustomization {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A failure annotated with the sub-operation that produced it
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },

    /// Independent failures collected during the loading phase
    #[error(transparent)]
    Aggregate(ErrorList),

    /// A patch does not match exactly one resource
    #[error("Patch target {target}: {reason}")]
    PatchTarget { target: String, reason: String },

    /// A patch could not be applied
    #[error("Failed to apply patch: {reason}")]
    Patch { reason: String },

    /// A configured field path runs through a value of the wrong shape
    #[error("Cannot mutate field '{path}' in {id}: {reason}")]
    FieldMutation {
        id: String,
        path: String,
        reason: String,
    },

    /// Invalid generator input
    #[error("Generator '{name}': {reason}")]
    Generator { name: String, reason: String },

    /// A CRD schema could not be interpreted
    #[error("CRD {path}: {reason}")]
    Crd { path: String, reason: String },

    /// A var names a resource whose field cannot be read
    #[error("Failed to resolve var '{name}': {source}")]
    VarFieldPath {
        name: String,
        #[source]
        source: kust_resource::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Loader or filesystem error from kust-fs
    #[error(transparent)]
    Fs(#[from] kust_fs::Error),

    /// Resource model error from kust-resource
    #[error(transparent)]
    Resource(#[from] kust_resource::Error),

    /// YAML deserialization error
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn patch(reason: impl Into<String>) -> Self {
        Self::Patch {
            reason: reason.into(),
        }
    }
}

/// Wrap errors with the sub-operation that produced them.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().context(f()))
    }
}

/// An ordered list of independent failures.
///
/// The loading phase appends to one of these instead of stopping at the
/// first failure, so every broken base, resource or generator is reported
/// in one run.
#[derive(Debug, Default)]
pub struct ErrorList {
    errors: Vec<Error>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<Error>) {
        self.errors.push(error.into());
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.errors.iter()
    }

    /// Keep the value of `result`, or record its error and return `None`.
    pub fn collect<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.push(e);
                None
            }
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise [`Error::Aggregate`].
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(self))
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "{} {noun} occurred:", self.errors.len())?;
        for error in &self.errors {
            let message = error.to_string().replace('\n', "\n    ");
            write!(f, "\n  * {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl IntoIterator for ErrorList {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}
