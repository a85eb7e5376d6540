use thiserror::Error;

/// Errors produced while building or querying a patch script.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The content source could not resolve a revision or a path inside it.
    #[error("{path} not found in revision {revision}")]
    NotFound { revision: String, path: String },

    /// A line index or range falls outside the file, or the edits are malformed.
    #[error("invalid line range in {path}: {reason}")]
    InvalidRange { path: String, reason: String },

    /// Lines were requested from a side that is only partially loaded.
    #[error("{path} is not loaded as a whole file")]
    Incomplete { path: String },

    /// Any other failure reported by the content source.
    #[error("content source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PatchError {
    pub(crate) fn invalid_range(path: &str, reason: impl Into<String>) -> Self {
        PatchError::InvalidRange {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error is the distinct "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PatchError::NotFound { .. })
    }
}

pub type Result<T, E = PatchError> = std::result::Result<T, E>;
