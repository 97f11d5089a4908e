//! Error types for kust-resource

/// Result type for kust-resource operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in kust-resource operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid resource: {reason}")]
    InvalidResource { reason: String },

    #[error("Duplicate resource id {id}")]
    DuplicateId { id: String },

    #[error("Resource {id} has no name and cannot be merged")]
    MissingName { id: String },

    #[error("Multiple resources match {id}: {}", candidates.join(", "))]
    Ambiguous { id: String, candidates: Vec<String> },

    #[error("Field path '{path}' not found in {id}")]
    FieldNotFound { id: String, path: String },

    #[error("Field path '{path}' in {id} does not hold a scalar value")]
    NotAScalar { id: String, path: String },

    #[error("Cannot hash {kind} '{name}': only ConfigMap and Secret are hashable")]
    Unhashable { kind: String, name: String },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidResource {
            reason: reason.into(),
        }
    }
}
