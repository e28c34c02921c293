//! Parsed commit nodes.

use super::ObjectId;

/// A commit as seen by the reachability walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// The commit's own id (after peeling, if the lookup started at a tag).
    pub id: ObjectId,
    /// Parent ids, in commit order.
    pub parents: Vec<ObjectId>,
    /// Committer time in seconds since the epoch. Only used to order the walk.
    pub commit_time: i64,
}

impl Commit {
    /// Create a commit node.
    pub fn new(id: ObjectId, parents: Vec<ObjectId>, commit_time: i64) -> Self {
        Self {
            id,
            parents,
            commit_time,
        }
    }

    /// Whether this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}
