//! Tests for resource quotas

use super::*;
use serde_json::json;

#[test]
fn test_valid_quantities() {
    for cpu in ["1", "0.5", "500m", "1.25m"] {
        assert!(
            ResourceQuota::new(cpu, "1Gi").validate().is_ok(),
            "cpu '{}' should be accepted",
            cpu
        );
    }
    for memory in ["512", "512Mi", "2G", "1.5Gi", "100Ki", "1T"] {
        assert!(
            ResourceQuota::new("1", memory).validate().is_ok(),
            "memory '{}' should be accepted",
            memory
        );
    }
}

#[test]
fn test_invalid_quantities() {
    let err = ResourceQuota::new("one", "1Gi").validate().unwrap_err();
    assert_eq!(err.field(), Some("cpu"));

    let err = ResourceQuota::new("1", "1GB").validate().unwrap_err();
    assert_eq!(err.field(), Some("memory"));
    assert!(err.to_string().contains("'1GB' is not a valid memory quantity"));

    assert!(ResourceQuota::new("500mi", "1Gi").validate().is_err());
}

#[test]
fn test_replicas_must_be_positive() {
    let resources = PipelineResources {
        sink: Some(ComponentResources {
            replicas: Some(0),
            ..Default::default()
        }),
        ..Default::default()
    };

    let err = resources.validate().unwrap_err();
    assert_eq!(err.field(), Some("sink.replicas"));
    assert!(err.to_string().contains("Replicas must be at least 1"));
}

#[test]
fn test_nested_error_path() {
    let resources: PipelineResources = serde_json::from_value(json!({
        "ingestor": {"limits": {"cpu": "lots"}}
    }))
    .unwrap();

    assert_eq!(
        resources.validate().unwrap_err().field(),
        Some("ingestor.limits.cpu")
    );
}

#[test]
fn test_patch_creates_missing_component() {
    let base = PipelineResources::default();
    let patch: PipelineResourcesPatch = serde_json::from_value(json!({
        "join": {"replicas": 2, "requests": {"memory": "256Mi"}}
    }))
    .unwrap();

    let updated = base.update(&patch).unwrap();
    let join = updated.join.unwrap();
    assert_eq!(join.replicas, Some(2));
    assert_eq!(join.requests.unwrap().memory.as_deref(), Some("256Mi"));
    assert!(updated.ingestor.is_none());
}

#[test]
fn test_patch_merges_and_clears() {
    let base = PipelineResources {
        ingestor: Some(ComponentResources {
            replicas: Some(3),
            requests: Some(ResourceQuota::new("250m", "128Mi")),
            limits: Some(ResourceQuota::new("1", "512Mi")),
        }),
        sink: Some(ComponentResources {
            replicas: Some(1),
            ..Default::default()
        }),
        ..Default::default()
    };

    let patch: PipelineResourcesPatch = serde_json::from_value(json!({
        "ingestor": {"requests": {"cpu": "500m"}, "limits": null},
        "sink": null
    }))
    .unwrap();

    let updated = base.update(&patch).unwrap();
    let ingestor = updated.ingestor.unwrap();
    assert_eq!(ingestor.replicas, Some(3));
    assert_eq!(ingestor.requests, Some(ResourceQuota::new("500m", "128Mi")));
    assert!(ingestor.limits.is_none());
    assert!(updated.sink.is_none());

    assert_eq!(base.ingestor.unwrap().requests.unwrap().cpu.as_deref(), Some("250m"));
}

#[test]
fn test_patch_rejects_bad_quantity() {
    let base = PipelineResources::default();
    let patch: PipelineResourcesPatch = serde_json::from_value(json!({
        "sink": {"limits": {"memory": "lots"}}
    }))
    .unwrap();

    let err = base.update(&patch).unwrap_err();
    assert_eq!(err.field(), Some("sink.limits.memory"));
}
