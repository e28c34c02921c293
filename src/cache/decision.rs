//! Single-flight LRU + TTL cache of visibility verdicts.

use std::sync::Arc;
use std::time::Duration;

use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::{instrument, warn};

use super::{Access, CacheSnapshot, CachedDecision};
use crate::graph::{GraphReader, RefSource};
use crate::reachability::VisibilityChecker;
use crate::telemetry;
use crate::types::{Identity, ObjectId};
use crate::Result;

/// Configuration for the decision cache.
///
/// ```rust
/// # use sightline::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(4096)
///     .ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached verdicts. Default: 1,024.
    pub max_entries: u64,
    /// Time-to-live of a verdict, measured from insertion. Default: 30 minutes.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1 << 10,
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

impl CacheConfig {
    /// Create a new config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached verdicts.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached verdicts.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    identity: Identity,
    repository: String,
    object_id: ObjectId,
}

/// Cache of per-user object visibility.
///
/// Thread-safe; share it behind an `Arc` across request handlers.
///
/// ```rust
/// # use sightline::{MemoryRepository, RequestAccess, VisibilityCache};
/// let mut repo = MemoryRepository::new();
/// let a = repo.commit(&[]);
/// let b = repo.commit(&[a]);
/// repo.set_ref("refs/heads/main", b);
///
/// let cache = VisibilityCache::new(false);
/// let access = RequestAccess::anonymous("project");
/// assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
/// ```
pub struct VisibilityCache {
    cache: Cache<CacheKey, bool>,
    checker: VisibilityChecker,
    config: CacheConfig,
}

impl VisibilityCache {
    /// Create a cache with the default checker policy and default limits.
    pub fn new(topo_sort: bool) -> Self {
        Self::with_checker(VisibilityChecker::new(topo_sort), &CacheConfig::default())
    }

    /// Create a cache with the default checker policy and custom limits.
    pub fn with_config(topo_sort: bool, config: &CacheConfig) -> Self {
        Self::with_checker(VisibilityChecker::new(topo_sort), config)
    }

    /// Create a cache around a preconfigured checker (e.g. a custom tier policy).
    pub fn with_checker(checker: VisibilityChecker, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self {
            cache,
            checker,
            config: config.clone(),
        }
    }

    /// The checker used on cache misses.
    pub fn checker(&self) -> &VisibilityChecker {
        &self.checker
    }

    /// The limits this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached verdict for the key, or run `compute` to produce it.
    ///
    /// Concurrent calls for the same key run `compute` once; the others block
    /// until it finishes and receive the same verdict or the same error.
    /// Errors are not cached.
    pub fn get_or_compute<F>(
        &self,
        identity: Identity,
        repository: &str,
        id: &ObjectId,
        compute: F,
    ) -> Result<bool>
    where
        F: FnOnce() -> Result<bool>,
    {
        let key = CacheKey {
            identity,
            repository: repository.to_owned(),
            object_id: *id,
        };

        let mut computed = false;
        let result = self.cache.try_get_with(key, || {
            computed = true;
            compute()
        });

        if computed {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        } else if result.is_ok() {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
        }

        result.map_err(Arc::unwrap_or_clone)
    }

    /// Whether `id` may be shown to the caller described by `access`.
    ///
    /// On a miss, reads refs and commits from `repo` on the calling thread.
    /// `known_reachable` ids are treated as additional visible commits; they
    /// are not part of the cache key.
    #[instrument(
        level = "debug",
        skip_all,
        fields(repository = access.repository_name(), object = %id)
    )]
    pub fn is_visible<A, R>(
        &self,
        access: &A,
        repo: &R,
        id: &ObjectId,
        known_reachable: &[ObjectId],
    ) -> Result<bool>
    where
        A: Access + ?Sized,
        R: GraphReader + RefSource + ?Sized,
    {
        self.get_or_compute(access.user_key(), access.repository_name(), id, || {
            self.checker.is_visible(repo, repo, id, known_reachable)
        })
    }

    /// Fail-closed variant of [`is_visible`](Self::is_visible) for request
    /// handlers.
    ///
    /// A graph read failure denies this one request and is logged. Nothing is
    /// cached, so a later request can still succeed.
    pub fn permits<A, R>(
        &self,
        access: &A,
        repo: &R,
        id: &ObjectId,
        known_reachable: &[ObjectId],
    ) -> bool
    where
        A: Access + ?Sized,
        R: GraphReader + RefSource + ?Sized,
    {
        match self.is_visible(access, repo, id, known_reachable) {
            Ok(visible) => visible,
            Err(e) => {
                metrics::counter!(telemetry::FAIL_CLOSED_TOTAL).increment(1);
                warn!(
                    repository = access.repository_name(),
                    object = %id,
                    error = %e,
                    "visibility check failed, denying"
                );
                false
            }
        }
    }

    /// Snapshot of the live entries. Does not change recency or expiry.
    pub fn inspect(&self) -> CacheSnapshot {
        let mut entries: Vec<CachedDecision> = self
            .cache
            .iter()
            .map(|(key, visible)| CachedDecision {
                identity: key.identity.clone(),
                repository: key.repository.clone(),
                object_id: key.object_id,
                visible,
            })
            .collect();
        entries.sort_by(|a, b| {
            (&a.repository, &a.object_id, &a.identity).cmp(&(
                &b.repository,
                &b.object_id,
                &b.identity,
            ))
        });

        CacheSnapshot {
            max_entries: self.config.max_entries,
            ttl_secs: self.config.ttl.as_secs(),
            entries,
        }
    }

    /// Approximate number of entries. Lags behind recent writes until
    /// [`run_pending_tasks`](Self::run_pending_tasks) runs.
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Whether the cache is (approximately) empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply pending eviction and expiry bookkeeping now.
    ///
    /// The backend batches this work; call it before [`inspect`](Self::inspect)
    /// when the exact capacity bound matters.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }

    /// Drop every cached verdict.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for VisibilityCache {
    fn default() -> Self {
        Self::new(false)
    }
}

impl std::fmt::Debug for VisibilityCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityCache")
            .field("checker", &self.checker)
            .field("config", &self.config)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
