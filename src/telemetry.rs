//! Telemetry metric name constants.
//!
//! Centralised metric names for sightline operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `sightline_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `outcome`: how a check ended: "tip", "reachable", "unreachable",
//!   "not_commit" or "error"
//! - `tier`: boundary tier walked (e.g. "heads", "tags", "other")

/// Total visibility checks computed by the engine (cache misses only).
///
/// Labels: `outcome`.
pub const CHECKS_TOTAL: &str = "sightline_checks_total";

/// Duration of a computed visibility check in seconds.
pub const CHECK_DURATION_SECONDS: &str = "sightline_check_duration_seconds";

/// Total commits expanded by ancestor walks.
///
/// Labels: `tier`.
pub const WALK_COMMITS_TOTAL: &str = "sightline_walk_commits_total";

/// Total decision cache hits, including callers that waited on an
/// in-flight computation for the same key.
pub const CACHE_HITS_TOTAL: &str = "sightline_cache_hits_total";

/// Total decision cache misses (one per computation started).
pub const CACHE_MISSES_TOTAL: &str = "sightline_cache_misses_total";

/// Total checks denied because the graph could not be read.
pub const FAIL_CLOSED_TOTAL: &str = "sightline_fail_closed_total";
