//! Ordered boundary classifiers.
//!
//! A [`TierPolicy`] splits a ref snapshot into tiers that the engine walks
//! one after the other, stopping at the first tier that proves the candidate
//! reachable. Frequently-updated pointers (branch heads) come first because
//! they tend to sit close to whatever is being browsed; rarely-updated
//! pointers (tags) come next; everything else last. Refs in an excluded
//! namespace (provisional review refs by default) never act as boundaries.

use crate::types::{ObjectId, Ref};

/// Conventional prefix for branch heads.
pub const HEADS_PREFIX: &str = "refs/heads/";
/// Conventional prefix for tags.
pub const TAGS_PREFIX: &str = "refs/tags/";
/// Conventional prefix for provisional change refs.
pub const CHANGES_PREFIX: &str = "refs/changes/";

/// Which refs a tier accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefMatcher {
    /// Refs whose name starts with any of the prefixes.
    Prefixes(Vec<String>),
    /// Every ref not claimed by an earlier tier.
    Remainder,
}

impl RefMatcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            RefMatcher::Prefixes(prefixes) => prefixes.iter().any(|p| name.starts_with(p.as_str())),
            RefMatcher::Remainder => true,
        }
    }
}

/// One named pass of the tiered search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryTier {
    /// Tier name, used in logs and metric labels.
    pub name: String,
    /// Refs this tier claims.
    pub matcher: RefMatcher,
}

/// Boundary ids of one tier, ready to be walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierBoundaries<'a> {
    /// Name of the tier these ids belong to.
    pub name: &'a str,
    /// Boundary ids, in snapshot order.
    pub ids: Vec<ObjectId>,
}

/// Ordered list of boundary tiers plus the excluded namespaces.
///
/// ```rust
/// # use sightline::reachability::TierPolicy;
/// let policy = TierPolicy::new()
///     .tier("branches", ["refs/heads/"])
///     .remainder("rest")
///     .exclude("refs/drafts/");
/// assert_eq!(policy.tiers().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    tiers: Vec<BoundaryTier>,
    excluded: Vec<String>,
}

impl Default for TierPolicy {
    /// Heads, then tags, then everything else; `refs/changes/` excluded.
    fn default() -> Self {
        Self::new()
            .tier("heads", [HEADS_PREFIX])
            .tier("tags", [TAGS_PREFIX])
            .remainder("other")
            .exclude(CHANGES_PREFIX)
    }
}

impl TierPolicy {
    /// An empty policy with no tiers. Add tiers with the builder methods.
    pub fn new() -> Self {
        Self {
            tiers: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Build the default three-tier layout from explicit prefix lists.
    pub fn from_prefixes<H, T, E>(heads: H, tags: T, excluded: E) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let mut policy = Self::new()
            .tier("heads", heads)
            .tier("tags", tags)
            .remainder("other");
        policy.excluded = excluded.into_iter().map(Into::into).collect();
        policy
    }

    /// Append a tier claiming refs with any of the given prefixes.
    pub fn tier<I>(mut self, name: impl Into<String>, prefixes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.tiers.push(BoundaryTier {
            name: name.into(),
            matcher: RefMatcher::Prefixes(prefixes.into_iter().map(Into::into).collect()),
        });
        self
    }

    /// Append a catch-all tier for refs no earlier tier claimed.
    pub fn remainder(mut self, name: impl Into<String>) -> Self {
        self.tiers.push(BoundaryTier {
            name: name.into(),
            matcher: RefMatcher::Remainder,
        });
        self
    }

    /// Never use refs under `prefix` as boundaries.
    pub fn exclude(mut self, prefix: impl Into<String>) -> Self {
        self.excluded.push(prefix.into());
        self
    }

    /// Tiers in evaluation order.
    pub fn tiers(&self) -> &[BoundaryTier] {
        &self.tiers
    }

    /// Excluded prefixes.
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Index of the tier that claims `name`, or `None` if the ref is
    /// excluded or no tier accepts it.
    pub fn classify(&self, name: &str) -> Option<usize> {
        if self.excluded.iter().any(|p| name.starts_with(p.as_str())) {
            return None;
        }
        self.tiers.iter().position(|t| t.matcher.matches(name))
    }

    /// Split a ref snapshot into per-tier boundary ids in a single pass.
    ///
    /// `extra_first` ids join the first tier ahead of its refs. Refs without
    /// a target are skipped. Every tier is present in the output, possibly
    /// empty.
    pub fn partition(&self, refs: &[Ref], extra_first: &[ObjectId]) -> Vec<TierBoundaries<'_>> {
        let mut out: Vec<TierBoundaries<'_>> = self
            .tiers
            .iter()
            .map(|t| TierBoundaries {
                name: t.name.as_str(),
                ids: Vec::new(),
            })
            .collect();

        if let Some(first) = out.first_mut() {
            first.ids.extend_from_slice(extra_first);
        }

        for r in refs {
            let Some(id) = r.boundary_id() else {
                continue;
            };
            if let Some(index) = self.classify(&r.name) {
                out[index].ids.push(id);
            }
        }
        out
    }
}
