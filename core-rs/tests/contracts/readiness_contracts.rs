//! Readiness Contract Tests
//!
//! The readiness poll is the only retry loop in the publisher. These tests
//! pin that it is bounded in time and that nothing runs after it gives up.

#[path = "../common/mod.rs"]
mod common;

use common::{Call, MemoryTriplestore};
use ontopub_core::{OntologyPublisher, PublishError, PublisherConfig, StorageKind};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// WHY: Waiting for the triplestore is bounded by the configured timeout
/// REASON: A server that never comes up must fail the deploy, not hang it
/// BREAKS: CI jobs and init containers stuck forever
/// SACRIFICES: If this fails, a dead triplestore means a hung pipeline
#[tokio::test]
async fn readiness_wait_is_bounded() {
    let store = Arc::new(MemoryTriplestore::new().unready_for(u32::MAX));
    let config = PublisherConfig::default()
        .with_readiness_timeout(Duration::from_millis(300))
        .with_poll_interval(Duration::from_millis(25));
    let publisher = OntologyPublisher::new(Arc::clone(&store), config);

    let started = Instant::now();
    let err = publisher
        .ensure_dataset("ontologies", StorageKind::Persistent)
        .await
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, PublishError::InfrastructureUnreachable { .. }), "got {:?}", err);
    assert_eq!(err.phase(), "readiness");
    assert!(elapsed >= Duration::from_millis(300), "gave up early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(3), "overran timeout: {:?}", elapsed);
}

/// WHY: Nothing is created on a server that never reported ready
/// REASON: A half-started server may reject or lose the create request
/// BREAKS: Datasets that exist in some restarts and not others
#[tokio::test]
async fn no_dataset_call_after_readiness_failure() {
    let store = Arc::new(MemoryTriplestore::new().unready_for(u32::MAX));
    let config = PublisherConfig::default()
        .with_readiness_timeout(Duration::from_millis(100))
        .with_poll_interval(Duration::from_millis(20));
    let publisher = OntologyPublisher::new(Arc::clone(&store), config);

    assert!(publisher.ensure_dataset("ontologies", StorageKind::Persistent).await.is_err());

    assert!(store.count_calls(|c| *c == Call::Ping) >= 2);
    assert_eq!(store.count_calls(|c| matches!(c, Call::CreateDataset(..))), 0);
    assert!(!store.has_dataset("ontologies"));
}
