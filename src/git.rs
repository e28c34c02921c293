//! libgit2-backed repository.
//!
//! [`GitRepository`] exposes a git repository on disk through
//! [`GraphReader`] and [`RefSource`]. `HEAD` is reported alongside the refs
//! under `refs/`, and annotated tags are peeled while enumerating.

use std::path::Path;

use git2::{ErrorCode, ObjectType, Oid, Reference, Repository};

use crate::graph::{GraphError, GraphReader, GraphResult, RefSource};
use crate::types::{Commit, ObjectId, Ref};
use crate::{Result, SightlineError};

/// A git repository opened through libgit2.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository at `path` (a work tree or a bare repository).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            repo: Repository::open(path)?,
        })
    }

    /// Search upwards from `path` for a repository and open it.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            repo: Repository::discover(path)?,
        })
    }

    /// Wrap an already opened repository.
    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    /// The underlying libgit2 handle.
    pub fn inner(&self) -> &Repository {
        &self.repo
    }

    /// Resolve a revision expression (`main`, `v1.0^`, a hex id) to an id.
    pub fn resolve(&self, rev: &str) -> Result<ObjectId> {
        let object = self.repo.revparse_single(rev).map_err(|e| {
            SightlineError::Git(format!("cannot resolve {rev:?}: {}", e.message()))
        })?;
        to_object_id(object.id()).map_err(SightlineError::from)
    }

    fn snapshot_ref(&self, reference: &Reference<'_>) -> GraphResult<Option<Ref>> {
        let Some(name) = reference.name() else {
            // Non UTF-8 names cannot be classified; skip them.
            return Ok(None);
        };

        // Symbolic refs (HEAD) are reported under their own name with the
        // resolved target.
        let direct = match reference.resolve() {
            Ok(direct) => direct,
            Err(err) => return unresolved(name, &err),
        };
        let Some(target) = direct.target() else {
            return Ok(None);
        };

        let peeled = match direct.target_peel() {
            Some(oid) => Some(oid),
            // Dangling targets and tags of non-commits peel to nothing; the
            // engine drops or rejects them later.
            None => direct
                .peel(ObjectType::Commit)
                .ok()
                .map(|o| o.id())
                .filter(|oid| *oid != target),
        };

        Ok(Some(Ref {
            name: name.to_owned(),
            target: Some(to_object_id(target)?),
            peeled: peeled.map(to_object_id).transpose()?,
        }))
    }
}

impl GraphReader for GitRepository {
    fn read_commit(&self, id: &ObjectId) -> GraphResult<Option<Commit>> {
        let oid = to_oid(id)?;
        let object = self
            .repo
            .find_object(oid, None)
            .map_err(|e| read_error(e, id))?;

        let object = if object.kind() == Some(ObjectType::Tag) {
            object.peel(ObjectType::Any).map_err(|e| read_error(e, id))?
        } else {
            object
        };

        let Ok(commit) = object.into_commit() else {
            return Ok(None);
        };
        let parents = commit
            .parent_ids()
            .map(to_object_id)
            .collect::<GraphResult<Vec<_>>>()?;
        Ok(Some(Commit::new(
            to_object_id(commit.id())?,
            parents,
            commit.time().seconds(),
        )))
    }
}

impl RefSource for GitRepository {
    fn refs(&self) -> GraphResult<Vec<Ref>> {
        let mut out = Vec::new();

        match self.repo.find_reference("HEAD") {
            Ok(head) => out.extend(self.snapshot_ref(&head)?),
            Err(e) if e.code() == ErrorCode::NotFound => {}
            Err(e) => return Err(GraphError::Io(e.message().to_owned())),
        }

        let references = self
            .repo
            .references()
            .map_err(|e| GraphError::Io(e.message().to_owned()))?;
        for reference in references {
            let reference = reference.map_err(|e| GraphError::Io(e.message().to_owned()))?;
            out.extend(self.snapshot_ref(&reference)?);
        }
        Ok(out)
    }
}

fn read_error(err: git2::Error, id: &ObjectId) -> GraphError {
    if err.code() == ErrorCode::NotFound {
        GraphError::Missing(*id)
    } else {
        GraphError::Io(err.message().to_owned())
    }
}

/// A symbolic ref whose target does not exist is unborn; any other failure
/// to resolve it is an I/O error.
fn unresolved(name: &str, err: &git2::Error) -> GraphResult<Option<Ref>> {
    if err.code() == ErrorCode::NotFound {
        Ok(Some(Ref {
            name: name.to_owned(),
            target: None,
            peeled: None,
        }))
    } else {
        Err(GraphError::Io(format!(
            "cannot resolve {name}: {}",
            err.message()
        )))
    }
}

fn to_oid(id: &ObjectId) -> GraphResult<Oid> {
    Oid::from_bytes(id.as_bytes()).map_err(|e| GraphError::Io(e.message().to_owned()))
}

fn to_object_id(oid: Oid) -> GraphResult<ObjectId> {
    ObjectId::from_slice(oid.as_bytes()).map_err(|e| GraphError::Io(e.to_string()))
}
