//! # ontopub - Ontology Publisher
//!
//! Gets ontology graphs into a Fuseki-compatible SPARQL triplestore and
//! proves that they actually landed. Every upload is followed by a triple
//! count scoped to the target graph; a load that leaves the graph empty is
//! an error, not a success.
//!
//! ## Workflow
//!
//! ```text
//!   ensure_dataset ──► publish(artifact) ──► publish_all([a, b, c])
//!        │                  │
//!   wait for /$/ping   validate ─► upload ─► verify count ─► diagnostics
//! ```
//!
//! ## Key Features
//!
//! - Idempotent dataset creation ("already exists" is success)
//! - Bounded readiness wait, the only retry loop in the crate
//! - Zero-triple detection after every upload
//! - Ordered batches, fail-fast by default
//! - Graph clearing only on explicit request
//!
//! ## Example
//!
//! ```no_run
//! use ontopub_core::{GraphTarget, OntologyArtifact, OntologyPublisher, PublisherConfig, StorageKind};
//!
//! # async fn run() -> ontopub_core::errors::Result<()> {
//! let publisher = OntologyPublisher::connect(PublisherConfig::from_env()?)?;
//! publisher.ensure_dataset("ontologies", StorageKind::Persistent).await?;
//!
//! let graph = GraphTarget::named("http://example.org/core")?;
//! let result = publisher
//!     .publish("ontologies", &OntologyArtifact::inferred("core.ttl", graph))
//!     .await?;
//! println!("{} triples", result.triple_count);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataset;
pub mod drivers;
pub mod errors;
pub mod ontology;
pub mod publisher;

pub use config::{Credentials, PublishManifest, PublisherConfig};
pub use config::manifest::MANIFEST_API_VERSION;
pub use dataset::{DatasetInfo, DatasetState, StorageKind};
pub use drivers::{HttpReply, HttpTransport, TransportError, TriplestoreTransport};
pub use errors::PublishError;
pub use ontology::{ContentType, GraphIri, GraphTarget, OntologyArtifact, SparqlQuery, SparqlUpdate};
pub use publisher::{
    ArtifactOutcome, BatchMode, BatchReport, DatasetStats, InheritanceCheck, NamespaceCheck, OntologyPublisher,
    PublishResult,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
