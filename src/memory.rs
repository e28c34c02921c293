//! In-process repository for tests, fixtures and embedding.
//!
//! [`MemoryRepository`] implements both [`GraphReader`] and [`RefSource`]
//! over plain maps. Ids are allocated from a counter and commit times
//! increase with every commit, so children are always newer than parents
//! unless the caller inserts commits with explicit times.

use std::collections::{BTreeMap, HashMap};

use crate::graph::{GraphError, GraphReader, GraphResult, RefSource};
use crate::types::{Commit, OBJECT_ID_LEN, ObjectId, Ref};

#[derive(Debug, Clone)]
enum Object {
    Commit { parents: Vec<ObjectId>, time: i64 },
    Tag { target: ObjectId },
    Blob,
}

/// A commit graph and ref table held in memory.
///
/// ```rust
/// # use sightline::{GraphReader, MemoryRepository};
/// let mut repo = MemoryRepository::new();
/// let a = repo.commit(&[]);
/// let b = repo.commit(&[a]);
/// repo.set_ref("refs/heads/main", b);
/// assert_eq!(repo.read_commit(&b).unwrap().unwrap().parents, vec![a]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    objects: HashMap<ObjectId, Object>,
    refs: BTreeMap<String, Ref>,
    next_id: u64,
    clock: i64,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ObjectId {
        self.next_id += 1;
        let mut bytes = [0u8; OBJECT_ID_LEN];
        bytes[OBJECT_ID_LEN - 8..].copy_from_slice(&self.next_id.to_be_bytes());
        // Keep generated ids away from the all-zero id.
        bytes[0] = 0xc0;
        ObjectId::from_bytes(bytes)
    }

    /// Add a commit with the given parents and return its id.
    pub fn commit(&mut self, parents: &[ObjectId]) -> ObjectId {
        self.clock += 1;
        let time = self.clock;
        let id = self.allocate_id();
        self.insert_commit(id, parents, time);
        id
    }

    /// Add a commit under a caller-chosen id and commit time.
    pub fn insert_commit(&mut self, id: ObjectId, parents: &[ObjectId], commit_time: i64) {
        self.clock = self.clock.max(commit_time);
        self.objects.insert(
            id,
            Object::Commit {
                parents: parents.to_vec(),
                time: commit_time,
            },
        );
    }

    /// Add an annotated tag object pointing at `target` and return its id.
    pub fn tag(&mut self, target: ObjectId) -> ObjectId {
        let id = self.allocate_id();
        self.objects.insert(id, Object::Tag { target });
        id
    }

    /// Add a non-commit object (stands in for blobs and trees).
    pub fn blob(&mut self) -> ObjectId {
        let id = self.allocate_id();
        self.objects.insert(id, Object::Blob);
        id
    }

    /// Remove an object, leaving anything that points at it dangling.
    pub fn remove_object(&mut self, id: &ObjectId) {
        self.objects.remove(id);
    }

    /// Point `name` at `target`, recording the peeled id when `target` is a tag.
    pub fn set_ref(&mut self, name: impl Into<String>, target: ObjectId) {
        let name = name.into();
        let peeled = self.peel(target).filter(|p| *p != target);
        self.refs.insert(
            name.clone(),
            Ref {
                name,
                target: Some(target),
                peeled,
            },
        );
    }

    /// Insert a ref exactly as given, without peeling.
    pub fn put_ref(&mut self, r: Ref) {
        self.refs.insert(r.name.clone(), r);
    }

    /// Delete a ref.
    pub fn delete_ref(&mut self, name: &str) {
        self.refs.remove(name);
    }

    /// Number of objects stored.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Follow tag objects until something that is not a tag. `None` if the
    /// chain runs into a missing object.
    fn peel(&self, mut id: ObjectId) -> Option<ObjectId> {
        // Tag chains are short; the bound only guards against self-referencing fixtures.
        for _ in 0..self.objects.len() + 1 {
            match self.objects.get(&id)? {
                Object::Tag { target } => id = *target,
                _ => return Some(id),
            }
        }
        None
    }
}

impl GraphReader for MemoryRepository {
    fn read_commit(&self, id: &ObjectId) -> GraphResult<Option<Commit>> {
        let mut current = *id;
        for _ in 0..self.objects.len() + 1 {
            match self.objects.get(&current) {
                None => return Err(GraphError::Missing(current)),
                Some(Object::Commit { parents, time }) => {
                    return Ok(Some(Commit::new(current, parents.clone(), *time)));
                }
                Some(Object::Tag { target }) => current = *target,
                Some(Object::Blob) => return Ok(None),
            }
        }
        Err(GraphError::Io(format!("tag cycle at {id}")))
    }
}

impl RefSource for MemoryRepository {
    fn refs(&self) -> GraphResult<Vec<Ref>> {
        Ok(self.refs.values().cloned().collect())
    }
}
