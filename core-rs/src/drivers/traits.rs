//! Transport trait for the triplestore HTTP surface
//!
//! Defines the abstract interface the publisher drives. Implementations:
//! - HttpTransport (reqwest, talks to a real Fuseki-compatible server)
//! - test doubles that record calls and return canned replies
//!
//! A transport only moves bytes and reports the status/body it observed.
//! Classifying a reply (accepted, duplicate, rejected) is the publisher's job,
//! since the same status means different things in different phases.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::dataset::StorageKind;
use crate::ontology::{ContentType, GraphTarget, SparqlQuery, SparqlUpdate};

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to complete an HTTP exchange at all (no status observed)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

pub type TransportResult = std::result::Result<HttpReply, TransportError>;

/// Triplestore transport trait
///
/// One method per endpoint the publisher uses. Every call is a single
/// attempt: implementations must not retry internally.
#[async_trait]
pub trait TriplestoreTransport: Send + Sync {
    /// `GET {base}/$/ping`
    async fn ping(&self) -> TransportResult;

    /// `POST {base}/$/datasets` with form fields `dbName`, `dbType`
    async fn create_dataset(&self, name: &str, storage: StorageKind) -> TransportResult;

    /// `GET {base}/$/datasets`
    async fn list_datasets(&self) -> TransportResult;

    /// `POST {base}/{dataset}/update` with a SPARQL Update body
    async fn update(&self, dataset: &str, update: &SparqlUpdate) -> TransportResult;

    /// `POST {base}/{dataset}/data?graph={iri}` (or `?default`)
    async fn upload(
        &self,
        dataset: &str,
        graph: &GraphTarget,
        content_type: ContentType,
        payload: Vec<u8>,
    ) -> TransportResult;

    /// `GET {base}/{dataset}/sparql?query=...` accepting SPARQL results JSON
    async fn query(&self, dataset: &str, query: &SparqlQuery) -> TransportResult;
}

#[async_trait]
impl<T: TriplestoreTransport + ?Sized> TriplestoreTransport for Arc<T> {
    async fn ping(&self) -> TransportResult {
        (**self).ping().await
    }

    async fn create_dataset(&self, name: &str, storage: StorageKind) -> TransportResult {
        (**self).create_dataset(name, storage).await
    }

    async fn list_datasets(&self) -> TransportResult {
        (**self).list_datasets().await
    }

    async fn update(&self, dataset: &str, update: &SparqlUpdate) -> TransportResult {
        (**self).update(dataset, update).await
    }

    async fn upload(
        &self,
        dataset: &str,
        graph: &GraphTarget,
        content_type: ContentType,
        payload: Vec<u8>,
    ) -> TransportResult {
        (**self).upload(dataset, graph, content_type, payload).await
    }

    async fn query(&self, dataset: &str, query: &SparqlQuery) -> TransportResult {
        (**self).query(dataset, query).await
    }
}
