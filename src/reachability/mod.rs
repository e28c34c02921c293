//! Commit visibility engine.
//!
//! [`VisibilityChecker`] decides whether an object may be shown by proving
//! it is a commit reachable from the repository's refs:
//!
//! 1. Non-commits are never visible.
//! 2. If any ref points straight at the object (directly or through a
//!    peeled tag), it is visible without touching the graph. This covers
//!    branch tips, tag targets and pending review refs.
//! 3. Otherwise the refs are split into ordered tiers by a [`TierPolicy`]
//!    and an ancestor walk runs per tier, stopping at the first tier that
//!    reaches the object. Commits expanded by a tier that failed are not
//!    expanded again by later tiers.
//!
//! The checker keeps no state between calls. Refs are enumerated once per
//! check, so ref updates are picked up by the next uncached query.

pub mod tier;
pub mod walk;

use std::time::Instant;

use tracing::debug;

use crate::Result;
use crate::graph::{GraphReader, RefSource};
use crate::telemetry;
use crate::types::{Commit, ObjectId};

pub use tier::{BoundaryTier, RefMatcher, TierBoundaries, TierPolicy};
pub use walk::{Walk, WalkOrder, WalkOutcome};

/// Checks whether objects are reachable from the refs of a repository.
///
/// ```rust
/// # use sightline::{MemoryRepository, VisibilityChecker};
/// let mut repo = MemoryRepository::new();
/// let a = repo.commit(&[]);
/// let b = repo.commit(&[a]);
/// repo.set_ref("refs/heads/main", b);
///
/// let checker = VisibilityChecker::new(false);
/// assert!(checker.is_visible(&repo, &repo, &a, &[]).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct VisibilityChecker {
    order: WalkOrder,
    policy: TierPolicy,
}

impl VisibilityChecker {
    /// Create a checker with the default tier policy.
    ///
    /// `topo_sort` selects the topological walk order. It never changes a
    /// verdict, only how much of the graph is read before reaching it.
    pub fn new(topo_sort: bool) -> Self {
        Self::with_policy(topo_sort, TierPolicy::default())
    }

    /// Create a checker with a custom tier policy.
    pub fn with_policy(topo_sort: bool, policy: TierPolicy) -> Self {
        Self {
            order: WalkOrder::from_topo_sort(topo_sort),
            policy,
        }
    }

    /// Whether the topological walk order is in use.
    pub fn topo_sort(&self) -> bool {
        self.order == WalkOrder::Topological
    }

    /// The tier policy applied to ref snapshots.
    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    /// Whether any ref points directly at `id`, before or after peeling.
    pub fn is_tip<R>(&self, refs: &R, id: &ObjectId) -> Result<bool>
    where
        R: RefSource + ?Sized,
    {
        Ok(!refs.tips_with_id(id)?.is_empty())
    }

    /// Whether `commit` is reachable from any of `starters`.
    ///
    /// `description` names the starter set (e.g. a tier name) in logs and
    /// metric labels. Missing starters and starters that are not commits are
    /// ignored.
    pub fn is_reachable_from<G>(
        &self,
        description: &str,
        graph: &G,
        commit: &Commit,
        starters: &[ObjectId],
    ) -> Result<bool>
    where
        G: GraphReader + ?Sized,
    {
        let mut walk = Walk::new(self.order);
        self.walk_tier(&mut walk, description, graph, commit, starters)
    }

    fn walk_tier<G>(
        &self,
        walk: &mut Walk,
        description: &str,
        graph: &G,
        commit: &Commit,
        starters: &[ObjectId],
    ) -> Result<bool>
    where
        G: GraphReader + ?Sized,
    {
        if starters.is_empty() {
            return Ok(false);
        }

        let outcome = walk.reaches(graph, commit, starters)?;
        metrics::counter!(telemetry::WALK_COMMITS_TOTAL, "tier" => description.to_owned())
            .increment(outcome.visited as u64);
        debug!(
            tier = description,
            target = %commit.id,
            starters = starters.len(),
            visited = outcome.visited,
            reachable = outcome.reachable,
            "ancestor walk finished"
        );
        Ok(outcome.reachable)
    }

    /// Decide whether `id` is visible in the repository.
    ///
    /// `known_reachable` lists commits the caller already knows are visible
    /// (for instance the commit a page was reached through). They are walked
    /// together with the first tier.
    ///
    /// Returns `Ok(false)` for objects that are not commits. Fails with
    /// [`SightlineError::GraphRead`](crate::SightlineError::GraphRead) when
    /// `id` does not exist or the graph or refs cannot be read.
    pub fn is_visible<G, R>(
        &self,
        graph: &G,
        refs: &R,
        id: &ObjectId,
        known_reachable: &[ObjectId],
    ) -> Result<bool>
    where
        G: GraphReader + ?Sized,
        R: RefSource + ?Sized,
    {
        let start = Instant::now();
        let result = self.check(graph, refs, id, known_reachable);
        Self::record_check(start, &result);
        result.map(|outcome| outcome.is_visible())
    }

    fn check<G, R>(
        &self,
        graph: &G,
        refs: &R,
        id: &ObjectId,
        known_reachable: &[ObjectId],
    ) -> Result<CheckOutcome>
    where
        G: GraphReader + ?Sized,
        R: RefSource + ?Sized,
    {
        let Some(commit) = graph.read_commit(id)? else {
            return Ok(CheckOutcome::NotACommit);
        };

        let snapshot = refs.refs()?;
        if snapshot.iter().any(|r| r.points_at(id)) {
            return Ok(CheckOutcome::Tip);
        }

        let mut walk = Walk::new(self.order);
        for tier in self.policy.partition(&snapshot, known_reachable) {
            if self.walk_tier(&mut walk, tier.name, graph, &commit, &tier.ids)? {
                return Ok(CheckOutcome::Reachable);
            }
        }
        Ok(CheckOutcome::Unreachable)
    }

    fn record_check(start: Instant, result: &Result<CheckOutcome>) {
        let outcome = match result {
            Ok(outcome) => outcome.label(),
            Err(_) => "error",
        };
        metrics::counter!(telemetry::CHECKS_TOTAL, "outcome" => outcome).increment(1);
        metrics::histogram!(telemetry::CHECK_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckOutcome {
    NotACommit,
    Tip,
    Reachable,
    Unreachable,
}

impl CheckOutcome {
    fn is_visible(self) -> bool {
        matches!(self, CheckOutcome::Tip | CheckOutcome::Reachable)
    }

    fn label(self) -> &'static str {
        match self {
            CheckOutcome::NotACommit => "not_commit",
            CheckOutcome::Tip => "tip",
            CheckOutcome::Reachable => "reachable",
            CheckOutcome::Unreachable => "unreachable",
        }
    }
}
