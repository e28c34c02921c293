//! Sightline error types

use crate::graph::GraphError;

/// Sightline error types
///
/// Only [`GraphRead`](SightlineError::GraphRead) can come out of a
/// visibility check. Non-commit candidates and dangling refs are folded into
/// the boolean verdict instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SightlineError {
    // Graph access errors
    #[error("graph read failed: {0}")]
    GraphRead(String),

    // Input errors
    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Opening or querying a git repository failed outside of a check.
    #[cfg(feature = "git")]
    #[error("git error: {0}")]
    Git(String),
}

impl SightlineError {
    /// Whether this error came from reading the commit graph.
    ///
    /// Request handlers treat these as "not visible" for the current request
    /// and retry on the next one.
    pub fn is_graph_read(&self) -> bool {
        matches!(self, SightlineError::GraphRead(_))
    }
}

impl From<GraphError> for SightlineError {
    fn from(err: GraphError) -> Self {
        SightlineError::GraphRead(err.to_string())
    }
}

#[cfg(feature = "git")]
impl From<git2::Error> for SightlineError {
    fn from(err: git2::Error) -> Self {
        SightlineError::Git(err.message().to_string())
    }
}

/// Result type alias for Sightline operations
pub type Result<T> = std::result::Result<T, SightlineError>;
