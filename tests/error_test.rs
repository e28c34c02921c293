use sightline::{GraphError, ObjectId, Result, SightlineError};

#[test]
fn test_error_display() {
    let err = SightlineError::GraphRead("pack truncated".to_string());
    assert_eq!(err.to_string(), "graph read failed: pack truncated");

    let err = SightlineError::Configuration("bad ttl".to_string());
    assert!(err.to_string().contains("bad ttl"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(SightlineError::InvalidObjectId("xyz".into()))
    }
    assert!(returns_error().is_err());
}

#[test]
fn graph_errors_become_graph_reads() {
    let id = ObjectId::from_bytes([0x11; 20]);
    let err: SightlineError = GraphError::Missing(id).into();
    assert!(err.is_graph_read());
    assert!(err.to_string().contains(&id.to_string()));

    let err: SightlineError = GraphError::Io("lock held".into()).into();
    assert_eq!(err, SightlineError::GraphRead("lock held".into()));
}

#[test]
fn only_graph_reads_are_graph_reads() {
    assert!(!SightlineError::InvalidObjectId("x".into()).is_graph_read());
    assert!(!SightlineError::Configuration("x".into()).is_graph_read());
}

#[test]
fn invalid_object_ids_are_rejected() {
    let err = "not-a-hash".parse::<ObjectId>().unwrap_err();
    assert!(matches!(err, SightlineError::InvalidObjectId(_)));
}

#[test]
fn errors_are_cloneable_for_shared_waiters() {
    let err = SightlineError::GraphRead("flaky".into());
    let shared = std::sync::Arc::new(err.clone());
    assert_eq!(std::sync::Arc::unwrap_or_clone(shared), err);
}
