//! Named pointers into the commit graph.

use serde::{Deserialize, Serialize};

use super::ObjectId;

/// A snapshot of one ref: its name, what it points at, and for annotated
/// tags the object the tag ultimately peels to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    /// Full ref name, e.g. `refs/heads/main`.
    pub name: String,
    /// Direct target. `None` for unborn or unresolvable symbolic refs.
    pub target: Option<ObjectId>,
    /// Peeled target for annotated tags.
    pub peeled: Option<ObjectId>,
}

impl Ref {
    /// A ref pointing directly at `target`.
    pub fn new(name: impl Into<String>, target: ObjectId) -> Self {
        Self {
            name: name.into(),
            target: Some(target),
            peeled: None,
        }
    }

    /// An annotated tag: `tag` is the tag object, `peeled` the commit it names.
    pub fn annotated(name: impl Into<String>, tag: ObjectId, peeled: ObjectId) -> Self {
        Self {
            name: name.into(),
            target: Some(tag),
            peeled: Some(peeled),
        }
    }

    /// The id used as a walk boundary: the peeled id if present, else the target.
    pub fn boundary_id(&self) -> Option<ObjectId> {
        self.peeled.or(self.target)
    }

    /// Whether this ref points at `id`, directly or after peeling.
    pub fn points_at(&self, id: &ObjectId) -> bool {
        self.target.as_ref() == Some(id) || self.peeled.as_ref() == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ObjectId {
        ObjectId::from_bytes([n; 20])
    }

    #[test]
    fn boundary_prefers_peeled() {
        let tag = Ref::annotated("refs/tags/v1", id(1), id(2));
        assert_eq!(tag.boundary_id(), Some(id(2)));

        let head = Ref::new("refs/heads/main", id(3));
        assert_eq!(head.boundary_id(), Some(id(3)));
    }

    #[test]
    fn points_at_matches_target_or_peeled() {
        let tag = Ref::annotated("refs/tags/v1", id(1), id(2));
        assert!(tag.points_at(&id(1)));
        assert!(tag.points_at(&id(2)));
        assert!(!tag.points_at(&id(3)));
    }

    #[test]
    fn unborn_ref_has_no_boundary() {
        let unborn = Ref {
            name: "HEAD".into(),
            target: None,
            peeled: None,
        };
        assert_eq!(unborn.boundary_id(), None);
        assert!(!unborn.points_at(&id(0)));
    }
}
