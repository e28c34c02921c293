//! Tests for config file loading.

#![cfg(feature = "cli")]

use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use sightline::config::Config;
use sightline::{Identity, MemoryRepository, RequestAccess, SightlineError};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_explicit_file() {
    let file = write_config(
        r#"
        [cache]
        max_entries = 8
        ttl_secs = 90

        [walk]
        topo_sort = true
        "#,
    );

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.cache.max_entries, 8);
    assert_eq!(config.cache_config().ttl, Duration::from_secs(90));
    assert!(config.walk.topo_sort);
}

#[test]
fn invalid_toml_is_a_configuration_error() {
    let file = write_config("[cache\nmax_entries = ");
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(matches!(err, SightlineError::Configuration(msg) if msg.contains("parse")));
}

#[test]
fn wrong_types_are_rejected() {
    let file = write_config("[cache]\nmax_entries = \"lots\"\n");
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn built_cache_applies_tier_settings() {
    let file = write_config(
        r#"
        [tiers]
        heads = ["refs/heads/"]
        tags = ["refs/tags/"]
        excluded = ["refs/changes/", "refs/drafts/"]
        "#,
    );
    let config = Config::load(Some(file.path())).unwrap();
    let cache = config.build_cache();

    let mut repo = MemoryRepository::new();
    let a = repo.commit(&[]);
    let b = repo.commit(&[a]);
    let c = repo.commit(&[b]);
    repo.set_ref("refs/heads/main", a);
    repo.set_ref("refs/drafts/wip", c);

    let access = RequestAccess::new(Identity::user("carol"), "project");
    assert!(cache.is_visible(&access, &repo, &a, &[]).unwrap());
    // Tip of an excluded ref is visible, its history is not.
    assert!(cache.is_visible(&access, &repo, &c, &[]).unwrap());
    assert!(!cache.is_visible(&access, &repo, &b, &[]).unwrap());
}
