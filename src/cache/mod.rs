//! Decision cache.
//!
//! [`VisibilityCache`] memoizes the engine's verdict per
//! `(identity, repository name, object id)`:
//!
//! - bounded: at most [`CacheConfig::max_entries`] entries, least recently
//!   used evicted first
//! - time-bounded: entries expire [`CacheConfig::ttl`] after insertion, which
//!   caps how stale a verdict can get after refs move
//! - single-flight: concurrent misses on one key run the computation once
//!   and every caller observes that one outcome
//!
//! Failed computations are never stored. Every caller waiting on a failed
//! computation sees the same error, and the next call for the key computes
//! again.
//!
//! # Architecture
//!
//! The cache is a moka LRU + TTL cache owned per instance. The computation
//! runs on the thread of the caller that won the key; moka's per-key
//! initializer blocks the others until it finishes. Unrelated keys never
//! wait on each other.

mod access;
mod decision;
mod snapshot;

pub use access::{Access, RequestAccess};
pub use decision::{CacheConfig, VisibilityCache};
pub use snapshot::{CacheSnapshot, CachedDecision};
