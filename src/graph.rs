//! Collaborator traits for reading the commit graph and enumerating refs.
//!
//! The engine needs only two capabilities from a repository:
//! - [`GraphReader`] resolves an id to a commit (or reports it is some
//!   other kind of object) and exposes its parents
//! - [`RefSource`] returns a fresh snapshot of all refs
//!
//! Both are synchronous: a check runs entirely on the caller's thread and
//! blocks on whatever I/O the implementation performs.
//!
//! # Error Semantics
//!
//! Implementations must keep "object does not exist" apart from every other
//! failure:
//! - [`GraphError::Missing`] lets the engine drop dangling ref targets
//! - [`GraphError::Io`] is surfaced to the caller and never cached

use crate::types::{Commit, ObjectId, Ref};

/// Failure reported by a graph or ref collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The object is not in the repository.
    #[error("missing object {0}")]
    Missing(ObjectId),

    /// Any other read failure (I/O, corruption, lock contention).
    #[error("{0}")]
    Io(String),
}

/// Result type for collaborator calls.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

// ============================================================================
// Graph Reader
// ============================================================================

/// Read access to the commit graph of one repository.
pub trait GraphReader {
    /// Resolve `id` to a commit.
    ///
    /// Annotated tags are peeled, so the returned commit's id may differ
    /// from `id`. Returns `Ok(None)` when the object exists but is not a
    /// commit (a blob, a tree, or a tag pointing at one).
    fn read_commit(&self, id: &ObjectId) -> GraphResult<Option<Commit>>;
}

impl<T: GraphReader + ?Sized> GraphReader for &T {
    fn read_commit(&self, id: &ObjectId) -> GraphResult<Option<Commit>> {
        (**self).read_commit(id)
    }
}

// ============================================================================
// Ref Source
// ============================================================================

/// Enumeration of the refs of one repository.
pub trait RefSource {
    /// Current snapshot of every ref, in no particular order.
    fn refs(&self) -> GraphResult<Vec<Ref>>;

    /// Refs whose target or peeled target is exactly `id`.
    ///
    /// Default implementation scans [`refs()`](Self::refs). Backends with a
    /// reverse index should override it.
    fn tips_with_id(&self, id: &ObjectId) -> GraphResult<Vec<Ref>> {
        Ok(self
            .refs()?
            .into_iter()
            .filter(|r| r.points_at(id))
            .collect())
    }
}

impl<T: RefSource + ?Sized> RefSource for &T {
    fn refs(&self) -> GraphResult<Vec<Ref>> {
        (**self).refs()
    }

    fn tips_with_id(&self, id: &ObjectId) -> GraphResult<Vec<Ref>> {
        (**self).tips_with_id(id)
    }
}
