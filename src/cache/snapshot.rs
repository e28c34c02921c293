//! Read-only view of the decision cache.

use serde::Serialize;

use crate::types::{Identity, ObjectId};

/// One stored verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedDecision {
    /// Identity the verdict was computed for.
    pub identity: Identity,
    /// Repository name.
    pub repository: String,
    /// Object the verdict is about.
    pub object_id: ObjectId,
    /// Whether the object is visible.
    pub visible: bool,
}

/// Occupancy of a [`VisibilityCache`](super::VisibilityCache) at one point in time.
///
/// Only live entries are listed; expired entries that have not been
/// reclaimed yet are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
    /// Configured capacity.
    pub max_entries: u64,
    /// Configured time-to-live in seconds.
    pub ttl_secs: u64,
    /// Live entries, ordered by repository, object id, then identity.
    pub entries: Vec<CachedDecision>,
}

impl CacheSnapshot {
    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache held no live entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the stored verdict for a key, if any.
    pub fn verdict(&self, identity: &Identity, repository: &str, id: &ObjectId) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| e.identity == *identity && e.repository == repository && e.object_id == *id)
            .map(|e| e.visible)
    }
}
