//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use sightline::telemetry;
use sightline::{GraphError, GraphReader, GraphResult, MemoryRepository, ObjectId};
use sightline::{Commit, Ref, RefSource, RequestAccess, VisibilityCache};

// ============================================================================
// Fixtures
// ============================================================================

struct BrokenRepo;

impl GraphReader for BrokenRepo {
    fn read_commit(&self, _id: &ObjectId) -> GraphResult<Option<Commit>> {
        Err(GraphError::Io("pack file truncated".into()))
    }
}

impl RefSource for BrokenRepo {
    fn refs(&self) -> GraphResult<Vec<Ref>> {
        Ok(Vec::new())
    }
}

fn repo() -> (MemoryRepository, ObjectId, ObjectId) {
    let mut repo = MemoryRepository::new();
    let a = repo.commit(&[]);
    let b = repo.commit(&[a]);
    let c = repo.commit(&[b]);
    repo.set_ref("refs/heads/main", c);
    (repo, a, c)
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    counter_with_label(snapshot, name, None)
}

/// Sum counter values matching a metric name and, optionally, one label.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| match label {
            None => true,
            Some((k, v)) => key
                .key()
                .labels()
                .any(|l| l.key() == k && l.value() == v),
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn miss_then_hit_records_cache_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let (repo, a, _) = repo();

    metrics::with_local_recorder(&recorder, || {
        let cache = VisibilityCache::default();
        let access = RequestAccess::anonymous("project");
        assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
        assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
        assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 2);
    assert_eq!(counter_total(&snapshot, telemetry::CHECKS_TOTAL), 1);
    assert!(
        has_histogram(&snapshot, telemetry::CHECK_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[test]
fn check_outcomes_are_labelled() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let (mut repo, a, c) = repo();
    let blob = repo.blob();
    let orphan = repo.commit(&[]);

    metrics::with_local_recorder(&recorder, || {
        let cache = VisibilityCache::default();
        let access = RequestAccess::anonymous("project");
        for id in [a, c, blob, orphan] {
            cache.is_visible(&access, &repo, &id, &[]).unwrap();
        }
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let outcome =
        |v: &str| counter_with_label(&snapshot, telemetry::CHECKS_TOTAL, Some(("outcome", v)));
    assert_eq!(outcome("reachable"), 1);
    assert_eq!(outcome("tip"), 1);
    assert_eq!(outcome("not_commit"), 1);
    assert_eq!(outcome("unreachable"), 1);
}

#[test]
fn walks_record_visited_commits_per_tier() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let (repo, a, _) = repo();

    metrics::with_local_recorder(&recorder, || {
        let cache = VisibilityCache::default();
        let access = RequestAccess::anonymous("project");
        assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
    });

    let snapshot = snapshotter.snapshot().into_vec();
    // main -> c: expands c then b, whose parent is a.
    let heads = counter_with_label(
        &snapshot,
        telemetry::WALK_COMMITS_TOTAL,
        Some(("tier", "heads")),
    );
    assert_eq!(heads, 2);
}

#[test]
fn later_tiers_are_skipped_once_heads_reach() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let (mut repo, a, c) = repo();
    let tag = repo.tag(c);
    let release = repo.commit(&[]);
    let note = repo.commit(&[]);
    repo.set_ref("refs/tags/v1", tag);
    repo.set_ref("refs/tags/v2", release);
    repo.set_ref("refs/notes/x", note);

    metrics::with_local_recorder(&recorder, || {
        let cache = VisibilityCache::default();
        let access = RequestAccess::anonymous("project");
        assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let tier =
        |v: &str| counter_with_label(&snapshot, telemetry::WALK_COMMITS_TOTAL, Some(("tier", v)));
    assert_eq!(tier("heads"), 2);
    assert_eq!(tier("tags"), 0);
    assert_eq!(tier("other"), 0);
}

#[test]
fn tags_are_walked_when_heads_fall_short() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let (mut repo, a, c) = repo();
    let unrelated = repo.commit(&[]);
    let tag = repo.tag(c);
    let note = repo.commit(&[]);
    repo.set_ref("refs/heads/main", unrelated);
    repo.set_ref("refs/tags/v1", tag);
    repo.set_ref("refs/notes/x", note);

    metrics::with_local_recorder(&recorder, || {
        let cache = VisibilityCache::default();
        let access = RequestAccess::anonymous("project");
        assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
    });

    let snapshot = snapshotter.snapshot().into_vec();
    let tier =
        |v: &str| counter_with_label(&snapshot, telemetry::WALK_COMMITS_TOTAL, Some(("tier", v)));
    assert_eq!(tier("heads"), 1);
    assert_eq!(tier("tags"), 2);
    assert_eq!(tier("other"), 0);
}

#[test]
fn fail_closed_denials_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let id = ObjectId::from_bytes([3; 20]);

    metrics::with_local_recorder(&recorder, || {
        let cache = VisibilityCache::default();
        let access = RequestAccess::anonymous("project");
        assert!(!cache.permits(&access, &BrokenRepo, &id, &[]));
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_total(&snapshot, telemetry::FAIL_CLOSED_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::CHECKS_TOTAL, Some(("outcome", "error"))),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 0);
}

#[test]
fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let (repo, a, _) = repo();
    let cache = VisibilityCache::default();
    let access = RequestAccess::anonymous("project");
    assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
}
