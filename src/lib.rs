//! Sightline - per-user commit visibility for source browsers
//!
//! This crate answers "may this object be shown to this user in this
//! repository?" by proving the object is a commit reachable from the
//! repository's refs, and memoizes the verdict in a bounded, expiring,
//! single-flight cache keyed on `(identity, repository name, object id)`.
//!
//! The repository itself is supplied by the caller through two small
//! traits, [`GraphReader`] and [`RefSource`]. [`MemoryRepository`] implements
//! both in memory; with the `git` feature, [`GitRepository`] implements them
//! over libgit2.
//!
//! # Example
//!
//! ```rust
//! use sightline::{MemoryRepository, RequestAccess, VisibilityCache};
//!
//! let mut repo = MemoryRepository::new();
//! let a = repo.commit(&[]);
//! let b = repo.commit(&[a]);
//! let c = repo.commit(&[b]);
//! let orphan = repo.commit(&[]);
//! repo.set_ref("refs/heads/main", c);
//!
//! let cache = VisibilityCache::new(false);
//! let access = RequestAccess::anonymous("project");
//!
//! assert!(cache.is_visible(&access, &repo, &a, &[])?);
//! assert!(!cache.is_visible(&access, &repo, &orphan, &[])?);
//! # Ok::<(), sightline::SightlineError>(())
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod error;
#[cfg(feature = "git")]
pub mod git;
pub mod graph;
pub mod memory;
pub mod reachability;
pub mod telemetry;
pub mod types;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types at crate root
pub use cache::{Access, CacheConfig, CacheSnapshot, CachedDecision, RequestAccess, VisibilityCache};
pub use error::{Result, SightlineError};
#[cfg(feature = "git")]
pub use git::GitRepository;
pub use graph::{GraphError, GraphReader, GraphResult, RefSource};
pub use memory::MemoryRepository;
pub use reachability::{TierPolicy, VisibilityChecker};
pub use types::{Commit, Identity, ObjectId, Ref};
