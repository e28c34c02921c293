//! Ancestor walk from a boundary set toward the roots.
//!
//! The walk answers "is `target` an ancestor of (or equal to) any boundary
//! commit?". It starts from the boundaries, follows parent edges through an
//! explicit frontier with a seen set, and stops as soon as `target` shows
//! up. Exhausting the frontier means no boundary reaches `target`.
//!
//! Two visiting orders are available. Both visit the same commits when the
//! answer is "no" and always produce the same verdict; they differ only in
//! how quickly a "yes" is found.
//!
//! - [`WalkOrder::Date`]: newest commit first
//! - [`WalkOrder::Topological`]: a commit is expanded only once every
//!   discovered child of it has been expanded, newest first among those.
//!   On merge-heavy histories this keeps the walk from racing down one side
//!   of a merge before the other side catches up.

use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::Result;
use crate::graph::{GraphError, GraphReader};
use crate::types::{Commit, ObjectId};

/// Order in which the walk expands commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkOrder {
    /// Newest commit time first.
    #[default]
    Date,
    /// Children before parents across merges, then newest first.
    Topological,
}

impl WalkOrder {
    /// `Topological` when `topo_sort` is set, `Date` otherwise.
    pub fn from_topo_sort(topo_sort: bool) -> Self {
        if topo_sort {
            WalkOrder::Topological
        } else {
            WalkOrder::Date
        }
    }
}

/// Result of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Whether `target` is reachable from the boundary set.
    pub reachable: bool,
    /// Commits expanded before the walk stopped.
    pub visited: usize,
}

/// Walk parent edges from `boundaries` looking for `target`.
///
/// Boundary ids that are missing or are not commits are ignored. Any other
/// read failure, and any missing parent of a reachable commit, aborts the
/// walk with [`SightlineError::GraphRead`](crate::SightlineError::GraphRead).
pub fn reaches<G>(
    graph: &G,
    target: &Commit,
    boundaries: &[ObjectId],
    order: WalkOrder,
) -> Result<WalkOutcome>
where
    G: GraphReader + ?Sized,
{
    Walk::new(order).reaches(graph, target, boundaries)
}

/// Ancestor walk state carried across several boundary sets for one target.
///
/// A walk that ends unreachable has expanded every commit it has seen, and
/// none of them reaches the target. The next call on the same `Walk` stops
/// at those commits instead of expanding them again. After a reachable
/// outcome or an error the state is reset.
///
/// ```rust
/// # use sightline::MemoryRepository;
/// # use sightline::GraphReader;
/// # use sightline::reachability::{Walk, WalkOrder};
/// let mut repo = MemoryRepository::new();
/// let a = repo.commit(&[]);
/// let b = repo.commit(&[a]);
/// let c = repo.commit(&[b]);
/// let target = repo.read_commit(&c).unwrap().unwrap();
///
/// let mut walk = Walk::new(WalkOrder::Date);
/// assert!(!walk.reaches(&repo, &target, &[b]).unwrap().reachable);
/// // `b` and `a` were already expanded.
/// assert_eq!(walk.reaches(&repo, &target, &[b]).unwrap().visited, 0);
/// ```
#[derive(Debug, Clone)]
pub struct Walk {
    order: WalkOrder,
    seen: HashSet<ObjectId>,
}

impl Walk {
    /// Start with no settled commits.
    pub fn new(order: WalkOrder) -> Self {
        Self {
            order,
            seen: HashSet::new(),
        }
    }

    /// Order in which commits are expanded.
    pub fn order(&self) -> WalkOrder {
        self.order
    }

    /// Number of ids settled by earlier unreachable walks.
    pub fn settled(&self) -> usize {
        self.seen.len()
    }

    /// Walk parent edges from `boundaries` looking for `target`, skipping
    /// commits settled by earlier calls. See [`reaches`] for error handling.
    pub fn reaches<G>(
        &mut self,
        graph: &G,
        target: &Commit,
        boundaries: &[ObjectId],
    ) -> Result<WalkOutcome>
    where
        G: GraphReader + ?Sized,
    {
        let result = self.expand(graph, target, boundaries);
        if !matches!(result, Ok(WalkOutcome { reachable: false, .. })) {
            self.seen.clear();
        }
        result
    }

    fn expand<G>(
        &mut self,
        graph: &G,
        target: &Commit,
        boundaries: &[ObjectId],
    ) -> Result<WalkOutcome>
    where
        G: GraphReader + ?Sized,
    {
        let mut frontier = Frontier::new(self.order);
        let seen = &mut self.seen;

        for id in boundaries {
            if *id == target.id {
                return Ok(WalkOutcome {
                    reachable: true,
                    visited: 0,
                });
            }
            if !seen.insert(*id) {
                continue;
            }
            match graph.read_commit(id) {
                Ok(Some(commit)) => {
                    if commit.id == target.id {
                        return Ok(WalkOutcome {
                            reachable: true,
                            visited: 0,
                        });
                    }
                    // A peeled tag may land on a commit already queued or settled.
                    if commit.id == *id || seen.insert(commit.id) {
                        frontier.push(commit);
                    }
                }
                // Dangling refs and refs to non-commits do not contribute.
                Ok(None) | Err(GraphError::Missing(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let mut visited = 0;
        while let Some(commit) = frontier.pop() {
            visited += 1;
            for parent in &commit.parents {
                if *parent == target.id {
                    return Ok(WalkOutcome {
                        reachable: true,
                        visited,
                    });
                }
                if !seen.insert(*parent) {
                    continue;
                }
                if let Some(parent_commit) = graph.read_commit(parent)? {
                    frontier.push(parent_commit);
                }
            }
        }

        Ok(WalkOutcome {
            reachable: false,
            visited,
        })
    }
}

// ============================================================================
// Frontiers
// ============================================================================

enum Frontier {
    Date(DateFrontier),
    Topological(TopoFrontier),
}

impl Frontier {
    fn new(order: WalkOrder) -> Self {
        match order {
            WalkOrder::Date => Frontier::Date(DateFrontier::default()),
            WalkOrder::Topological => Frontier::Topological(TopoFrontier::default()),
        }
    }

    fn push(&mut self, commit: Commit) {
        match self {
            Frontier::Date(f) => f.push(commit),
            Frontier::Topological(f) => f.push(commit),
        }
    }

    fn pop(&mut self) -> Option<Commit> {
        match self {
            Frontier::Date(f) => f.pop(),
            Frontier::Topological(f) => f.pop(),
        }
    }
}

/// Max-heap on `(commit_time, id)`.
#[derive(Default)]
struct DateFrontier {
    heap: BinaryHeap<(i64, ObjectId)>,
    commits: HashMap<ObjectId, Commit>,
}

impl DateFrontier {
    fn push(&mut self, commit: Commit) {
        self.heap.push((commit.commit_time, commit.id));
        self.commits.insert(commit.id, commit);
    }

    fn pop(&mut self) -> Option<Commit> {
        while let Some((_, id)) = self.heap.pop() {
            if let Some(commit) = self.commits.remove(&id) {
                return Some(commit);
            }
        }
        None
    }
}

/// Date-ordered heap that holds a commit back while any discovered child of
/// it is still waiting to be expanded.
#[derive(Default)]
struct TopoFrontier {
    ready: BinaryHeap<(i64, ObjectId)>,
    commits: HashMap<ObjectId, Commit>,
    /// Discovered-but-unexpanded children per commit id.
    pending_children: HashMap<ObjectId, usize>,
    /// Commits popped from `ready` while they still had pending children.
    held: HashSet<ObjectId>,
}

impl TopoFrontier {
    fn push(&mut self, commit: Commit) {
        for parent in &commit.parents {
            *self.pending_children.entry(*parent).or_insert(0) += 1;
        }
        self.ready.push((commit.commit_time, commit.id));
        self.commits.insert(commit.id, commit);
    }

    fn pending(&self, id: &ObjectId) -> usize {
        self.pending_children.get(id).copied().unwrap_or(0)
    }

    fn pop(&mut self) -> Option<Commit> {
        let id = loop {
            match self.ready.pop() {
                Some((_, id)) => {
                    if !self.commits.contains_key(&id) {
                        continue;
                    }
                    if self.pending(&id) > 0 {
                        self.held.insert(id);
                        continue;
                    }
                    break id;
                }
                None => {
                    // Only reachable on cyclic (corrupt) input: release the
                    // newest held commit so the walk still terminates.
                    let id = self
                        .held
                        .iter()
                        .filter_map(|id| self.commits.get(id))
                        .max_by_key(|c| (c.commit_time, c.id))
                        .map(|c| c.id)?;
                    break id;
                }
            }
        };

        self.held.remove(&id);
        let commit = self.commits.remove(&id)?;
        for parent in &commit.parents {
            if let Entry::Occupied(mut slot) = self.pending_children.entry(*parent) {
                *slot.get_mut() = slot.get().saturating_sub(1);
                if *slot.get() == 0 {
                    slot.remove();
                    if self.held.remove(parent) {
                        if let Some(c) = self.commits.get(parent) {
                            self.ready.push((c.commit_time, c.id));
                        }
                    }
                }
            }
        }
        Some(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRepository;

    fn commit(repo: &MemoryRepository, id: &ObjectId) -> Commit {
        repo.read_commit(id).unwrap().unwrap()
    }

    #[test]
    fn date_frontier_pops_newest_first() {
        let mut f = DateFrontier::default();
        let a = ObjectId::from_bytes([1; 20]);
        let b = ObjectId::from_bytes([2; 20]);
        f.push(Commit::new(a, vec![], 10));
        f.push(Commit::new(b, vec![], 20));
        assert_eq!(f.pop().map(|c| c.id), Some(b));
        assert_eq!(f.pop().map(|c| c.id), Some(a));
        assert!(f.pop().is_none());
    }

    #[test]
    fn topo_frontier_holds_parent_until_children_expand() {
        // m is a merge of x and p; x is a child of p. p is discovered from m
        // before x is expanded, and is newer than x by clock skew.
        let p = ObjectId::from_bytes([1; 20]);
        let x = ObjectId::from_bytes([2; 20]);
        let m = ObjectId::from_bytes([3; 20]);

        let mut f = TopoFrontier::default();
        f.push(Commit::new(m, vec![x, p], 30));
        assert_eq!(f.pop().map(|c| c.id), Some(m));
        f.push(Commit::new(x, vec![p], 10));
        f.push(Commit::new(p, vec![], 20));

        let order: Vec<_> = std::iter::from_fn(|| f.pop()).map(|c| c.id).collect();
        assert_eq!(order, vec![x, p]);
    }

    #[test]
    fn date_frontier_follows_skewed_timestamps() {
        let p = ObjectId::from_bytes([1; 20]);
        let x = ObjectId::from_bytes([2; 20]);

        let mut f = DateFrontier::default();
        f.push(Commit::new(x, vec![p], 10));
        f.push(Commit::new(p, vec![], 20));
        let order: Vec<_> = std::iter::from_fn(|| f.pop()).map(|c| c.id).collect();
        assert_eq!(order, vec![p, x]);
    }

    #[test]
    fn finds_ancestor_through_merge() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit(&[]);
        let left = repo.commit(&[root]);
        let right = repo.commit(&[root]);
        let merge = repo.commit(&[left, right]);
        let target = commit(&repo, &right);

        for order in [WalkOrder::Date, WalkOrder::Topological] {
            let out = reaches(&repo, &target, &[merge], order).unwrap();
            assert!(out.reachable, "{order:?}");
        }
    }

    #[test]
    fn descendant_is_not_reachable_from_ancestor() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit(&[]);
        let b = repo.commit(&[a]);
        let target = commit(&repo, &b);

        for order in [WalkOrder::Date, WalkOrder::Topological] {
            let out = reaches(&repo, &target, &[a], order).unwrap();
            assert!(!out.reachable);
            assert_eq!(out.visited, 1);
        }
    }

    #[test]
    fn boundary_equal_to_target_needs_no_walk() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit(&[]);
        let target = commit(&repo, &a);
        let out = reaches(&repo, &target, &[a], WalkOrder::Date).unwrap();
        assert_eq!(
            out,
            WalkOutcome {
                reachable: true,
                visited: 0
            }
        );
    }

    #[test]
    fn missing_and_non_commit_boundaries_are_ignored() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit(&[]);
        let b = repo.commit(&[a]);
        let blob = repo.blob();
        let ghost = ObjectId::from_bytes([0xee; 20]);
        let target = commit(&repo, &a);

        let out = reaches(&repo, &target, &[ghost, blob, b], WalkOrder::Date).unwrap();
        assert!(out.reachable);
    }

    #[test]
    fn missing_parent_is_a_read_failure() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit(&[]);
        let b = repo.commit(&[a]);
        let c = repo.commit(&[b]);
        let unrelated = repo.commit(&[]);
        repo.remove_object(&b);
        let target = commit(&repo, &unrelated);

        let err = reaches(&repo, &target, &[c], WalkOrder::Date).unwrap_err();
        assert!(err.is_graph_read());
    }

    #[test]
    fn walk_skips_commits_settled_by_earlier_boundaries() {
        let mut repo = MemoryRepository::new();
        let root = repo.commit(&[]);
        let mid = repo.commit(&[root]);
        let tip = repo.commit(&[mid]);
        let side = repo.commit(&[mid]);
        let orphan = repo.commit(&[]);
        let target = commit(&repo, &orphan);

        for order in [WalkOrder::Date, WalkOrder::Topological] {
            let mut walk = Walk::new(order);
            let first = walk.reaches(&repo, &target, &[tip]).unwrap();
            assert_eq!(first.visited, 3);
            assert_eq!(walk.settled(), 3);

            // Only `side` is new; its parent was settled by the first walk.
            let second = walk.reaches(&repo, &target, &[side, tip]).unwrap();
            assert!(!second.reachable);
            assert_eq!(second.visited, 1);
        }
    }

    #[test]
    fn walk_resets_after_reaching_the_target() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit(&[]);
        let b = repo.commit(&[a]);
        let target = commit(&repo, &a);

        let mut walk = Walk::new(WalkOrder::Date);
        assert!(walk.reaches(&repo, &target, &[b]).unwrap().reachable);
        assert_eq!(walk.settled(), 0);
        assert!(walk.reaches(&repo, &target, &[b]).unwrap().reachable);
    }

    #[test]
    fn empty_boundary_set_is_unreachable() {
        let mut repo = MemoryRepository::new();
        let a = repo.commit(&[]);
        let target = commit(&repo, &a);
        let out = reaches(&repo, &target, &[], WalkOrder::Topological).unwrap();
        assert!(!out.reachable);
        assert_eq!(out.visited, 0);
    }
}
