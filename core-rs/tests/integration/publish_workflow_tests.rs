//! Publish Workflow Integration Tests
//!
//! Drives OntologyPublisher end to end against an in-memory triplestore:
//! dataset creation, upload, verification, batches and explicit clears.
//!
//! Uses tempfile for isolation - NO /tmp pollution

#[path = "../common/mod.rs"]
mod common;

use common::{test_config, write_turtle, Call, MemoryTriplestore};
use ontopub_core::{
    BatchMode, ContentType, DatasetState, GraphTarget, OntologyArtifact, OntologyPublisher, PublishError,
    PublishManifest, StorageKind,
};
use std::sync::Arc;
use tempfile::TempDir;

fn named(iri: &str) -> GraphTarget {
    GraphTarget::named(iri).unwrap()
}

fn publisher(store: &Arc<MemoryTriplestore>) -> OntologyPublisher<Arc<MemoryTriplestore>> {
    OntologyPublisher::new(Arc::clone(store), test_config())
}

#[tokio::test]
async fn test_end_to_end_fresh_dataset() {
    let temp = TempDir::new().unwrap();
    let core = write_turtle(temp.path(), "core.ttl", 42);
    let store = Arc::new(MemoryTriplestore::new());
    let publisher = publisher(&store);

    assert!(!store.has_dataset("ontologies"));
    let state = publisher.ensure_dataset("ontologies", StorageKind::Persistent).await.unwrap();
    assert_eq!(state, DatasetState::Created);

    let artifact = OntologyArtifact::inferred(&core, named("http://example.org/core"));
    assert_eq!(artifact.content_type(), ContentType::Turtle);

    let result = publisher.publish("ontologies", &artifact).await.unwrap();
    assert_eq!(result.triple_count, 42);
    assert!(result.status == 200 || result.status == 201);
    assert_eq!(result.graph.as_deref(), Some("http://example.org/core"));
    assert_eq!(result.class_count, Some(14));
    assert_eq!(result.object_property_count, Some(0));
    assert_eq!(store.triples_in("ontologies", &named("http://example.org/core")), 42);
}

#[tokio::test]
async fn test_ensure_dataset_is_idempotent() {
    let store = Arc::new(MemoryTriplestore::new());
    let publisher = publisher(&store);

    let first = publisher.ensure_dataset("ontologies", StorageKind::InMemory).await.unwrap();
    let second = publisher.ensure_dataset("ontologies", StorageKind::InMemory).await.unwrap();

    assert!(first.was_created());
    assert_eq!(second, DatasetState::AlreadyExisted);
    assert!(first.exists() && second.exists());
    assert!(store.has_dataset("ontologies"));
    assert_eq!(
        store.count_calls(|c| matches!(c, Call::CreateDataset(_, StorageKind::InMemory))),
        2
    );
}

#[tokio::test]
async fn test_ensure_dataset_waits_for_readiness() {
    let store = Arc::new(MemoryTriplestore::new().unready_for(3));
    let publisher = publisher(&store);

    publisher.ensure_dataset("ontologies", StorageKind::Persistent).await.unwrap();

    assert_eq!(store.count_calls(|c| *c == Call::Ping), 4);
    // creation only after the server answered
    assert!(matches!(store.calls().last(), Some(Call::CreateDataset(..))));
}

#[tokio::test]
async fn test_default_graph_publish() {
    let temp = TempDir::new().unwrap();
    let path = write_turtle(temp.path(), "extra.ttl", 5);
    let store = Arc::new(MemoryTriplestore::new().with_dataset("ontologies"));
    let publisher = publisher(&store);

    let result = publisher
        .publish("ontologies", &OntologyArtifact::inferred(&path, GraphTarget::Default))
        .await
        .unwrap();

    assert_eq!(result.graph, None);
    assert_eq!(result.triple_count, 5);
    assert!(result.graph_target().unwrap().is_default());
}

#[tokio::test]
async fn test_republish_appends_and_clear_resets() {
    let temp = TempDir::new().unwrap();
    let path = write_turtle(temp.path(), "core.ttl", 10);
    let graph = named("http://example.org/core");
    let store = Arc::new(MemoryTriplestore::new().with_dataset("ontologies"));
    let publisher = publisher(&store);
    let artifact = OntologyArtifact::inferred(&path, graph.clone());

    publisher.publish("ontologies", &artifact).await.unwrap();
    // the graph is never cleared implicitly, so a second load accumulates
    let second = publisher.publish("ontologies", &artifact).await.unwrap();
    assert_eq!(second.triple_count, 20);
    assert_eq!(second.status, 200);

    publisher.clear_graph("ontologies", &graph).await.unwrap();
    assert_eq!(store.triples_in("ontologies", &graph), 0);

    let third = publisher.publish("ontologies", &artifact).await.unwrap();
    assert_eq!(third.triple_count, 10);
}

#[tokio::test]
async fn test_publish_all_fail_fast_preserves_order() {
    let temp = TempDir::new().unwrap();
    let a = write_turtle(temp.path(), "a.ttl", 3);
    let b = temp.path().join("b.ttl"); // never written
    let c = write_turtle(temp.path(), "c.ttl", 4);
    let store = Arc::new(MemoryTriplestore::new().with_dataset("ontologies"));
    let publisher = publisher(&store);

    let artifacts = vec![
        OntologyArtifact::inferred(&a, named("http://example.org/a")),
        OntologyArtifact::inferred(&b, named("http://example.org/b")),
        OntologyArtifact::inferred(&c, named("http://example.org/c")),
    ];
    let report = publisher.publish_all("ontologies", &artifacts).await;

    assert_eq!(report.len(), 2);
    assert!(!report.is_success());
    assert_eq!(report.skipped(), 1);
    assert!(report.outcomes[0].is_success());
    assert!(matches!(report.outcomes[1].error(), Some(PublishError::ArtifactNotFound { .. })));
    assert_eq!(store.uploaded_graphs(), vec![named("http://example.org/a")]);
    // earlier uploads stay in place
    assert_eq!(store.triples_in("ontologies", &named("http://example.org/a")), 3);
}

#[tokio::test]
async fn test_publish_all_continue_on_error() {
    let temp = TempDir::new().unwrap();
    let a = write_turtle(temp.path(), "a.ttl", 3);
    let b = write_turtle(temp.path(), "b.owl", 6);
    let c = write_turtle(temp.path(), "c.ttl", 4);
    let store = Arc::new(
        MemoryTriplestore::new()
            .with_dataset("ontologies")
            .reject_uploads(named("http://example.org/b"), 400, "Parse error"),
    );
    let publisher = publisher(&store);

    let artifacts = vec![
        OntologyArtifact::inferred(&a, named("http://example.org/a")),
        OntologyArtifact::inferred(&b, named("http://example.org/b")),
        OntologyArtifact::inferred(&c, named("http://example.org/c")),
    ];
    let report = publisher
        .publish_all_with_mode("ontologies", &artifacts, BatchMode::ContinueOnError)
        .await;

    assert_eq!(report.len(), 3);
    assert!(!report.is_success());
    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.total_triples(), 7);

    let failure = report.first_failure().unwrap();
    assert_eq!(failure.artifact.label(), "b.owl");
    match failure.error() {
        Some(PublishError::UploadRejected { status, body, .. }) => {
            assert_eq!(*status, Some(400));
            assert_eq!(body, "Parse error");
        }
        other => panic!("Expected UploadRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_into_missing_dataset_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = write_turtle(temp.path(), "core.ttl", 2);
    let store = Arc::new(MemoryTriplestore::new());
    let publisher = publisher(&store);

    let err = publisher
        .publish("ontologies", &OntologyArtifact::inferred(&path, GraphTarget::Default))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "UploadRejected");
    assert_eq!(err.phase(), "upload");
}

#[tokio::test]
async fn test_diagnostics_are_best_effort() {
    let temp = TempDir::new().unwrap();
    let path = write_turtle(temp.path(), "core.ttl", 6);
    let store = Arc::new(MemoryTriplestore::new().with_dataset("ontologies").break_diagnostics());
    let publisher = publisher(&store);

    let result = publisher
        .publish("ontologies", &OntologyArtifact::inferred(&path, named("http://example.org/core")))
        .await
        .unwrap();

    assert_eq!(result.triple_count, 6);
    assert_eq!(result.class_count, None);
    assert_eq!(result.object_property_count, None);
}

#[tokio::test]
async fn test_list_datasets_and_stats() {
    let temp = TempDir::new().unwrap();
    let path = write_turtle(temp.path(), "core.ttl", 8);
    let store = Arc::new(MemoryTriplestore::new().with_dataset("ontologies").with_dataset("scratch"));
    let publisher = publisher(&store);

    publisher
        .publish("ontologies", &OntologyArtifact::inferred(&path, named("http://example.org/core")))
        .await
        .unwrap();

    let datasets = publisher.list_datasets().await.unwrap();
    let names: Vec<_> = datasets.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["ontologies", "scratch"]);

    let stats = publisher.dataset_stats("ontologies").await.unwrap();
    assert_eq!(stats.total_triples, Some(8));
    // the in-memory store does not answer distinct-term queries
    assert_eq!(stats.unique_subjects, None);
}

#[tokio::test]
async fn test_manifest_drives_batch() {
    let temp = TempDir::new().unwrap();
    write_turtle(temp.path(), "gist.ttl", 9);
    write_turtle(temp.path(), "sow.ttl", 3);
    let manifest_path = temp.path().join("publish.yaml");
    std::fs::write(
        &manifest_path,
        r#"apiVersion: ontopub/v1
kind: PublishManifest
metadata:
  name: agentic-ontologies
spec:
  dataset: ontologies
  storage: in-memory
  artifacts:
    - path: gist.ttl
      graph: https://w3id.org/semanticarts/ontology/gistCore
    - path: sow.ttl
      graph: https://agentic-data-scraper.com/ontology/sow
"#,
    )
    .unwrap();

    let manifest = PublishManifest::load(&manifest_path).unwrap();
    let dataset = manifest.spec.dataset.clone().unwrap();
    let store = Arc::new(MemoryTriplestore::new());
    let publisher = publisher(&store);

    publisher.ensure_dataset(&dataset, manifest.spec.storage).await.unwrap();
    let report = publisher
        .publish_all(&dataset, &manifest.artifacts().unwrap())
        .await;

    assert!(report.is_success());
    assert_eq!(report.total_triples(), 12);
    assert_eq!(
        store.uploaded_graphs(),
        vec![
            named("https://w3id.org/semanticarts/ontology/gistCore"),
            named("https://agentic-data-scraper.com/ontology/sow"),
        ]
    );
}
