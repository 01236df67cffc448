//! Publish results and batch reports

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::PublishError;
use crate::ontology::{GraphTarget, OntologyArtifact};

/// Outcome of one successful artifact publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub dataset: String,
    /// Named graph IRI, `None` for the default graph
    pub graph: Option<String>,
    /// HTTP status of the upload (200 or 201)
    pub status: u16,
    /// Triples in the graph after the upload, always at least 1
    pub triple_count: u64,
    /// Distinct `owl:Class` terms; `None` when the diagnostic query failed
    pub class_count: Option<u64>,
    /// Distinct `owl:ObjectProperty` terms; `None` when the diagnostic query failed
    pub object_property_count: Option<u64>,
    pub published_at: DateTime<Utc>,
}

impl PublishResult {
    /// Rebuild the target; the IRI is validated again like any other input
    pub fn graph_target(&self) -> Result<GraphTarget, PublishError> {
        match &self.graph {
            Some(iri) => GraphTarget::named(iri.as_str()),
            None => Ok(GraphTarget::Default),
        }
    }
}

/// How `publish_all` reacts to a failing artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchMode {
    /// Stop at the first failure; later artifacts are never attempted
    #[default]
    FailFast,
    /// Attempt every artifact regardless of earlier failures
    ContinueOnError,
}

/// One attempted artifact and what happened to it
#[derive(Debug)]
pub struct ArtifactOutcome {
    pub artifact: OntologyArtifact,
    pub result: Result<PublishResult, PublishError>,
}

impl ArtifactOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&PublishError> {
        self.result.as_ref().err()
    }
}

/// Ordered outcomes of a `publish_all` run
///
/// Holds one entry per attempted artifact, in request order. Under
/// `BatchMode::FailFast` the last entry is the failure, if there was one.
#[derive(Debug)]
pub struct BatchReport {
    pub dataset: String,
    pub mode: BatchMode,
    /// Number of artifacts the caller asked for
    pub requested: usize,
    pub outcomes: Vec<ArtifactOutcome>,
}

impl BatchReport {
    pub fn new(dataset: impl Into<String>, mode: BatchMode, requested: usize) -> Self {
        Self {
            dataset: dataset.into(),
            mode,
            requested,
            outcomes: Vec::with_capacity(requested),
        }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Every requested artifact was attempted and published
    pub fn is_success(&self) -> bool {
        self.outcomes.len() == self.requested && self.outcomes.iter().all(ArtifactOutcome::is_success)
    }

    pub fn first_failure(&self) -> Option<&ArtifactOutcome> {
        self.outcomes.iter().find(|o| !o.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn results(&self) -> impl Iterator<Item = &PublishResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Artifacts never attempted because the batch stopped early
    pub fn skipped(&self) -> usize {
        self.requested.saturating_sub(self.outcomes.len())
    }

    pub fn total_triples(&self) -> u64 {
        self.results().map(|r| r.triple_count).sum()
    }
}

/// Dataset-wide counts; each is best-effort
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub dataset: String,
    pub total_triples: Option<u64>,
    pub unique_subjects: Option<u64>,
    pub unique_predicates: Option<u64>,
}

/// Whether classes from one ontology namespace are present
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceCheck {
    pub label: String,
    pub namespace: String,
    /// `None` when the count query failed
    pub class_count: Option<u64>,
}

impl NamespaceCheck {
    pub fn passed(&self) -> bool {
        self.class_count.is_some_and(|n| n > 0)
    }
}

/// Whether classes in one namespace extend classes in another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InheritanceCheck {
    pub sub_namespace: String,
    pub super_namespace: String,
    /// Distinct `rdfs:subClassOf` links; `None` when the count query failed
    pub link_count: Option<u64>,
}

impl InheritanceCheck {
    pub fn passed(&self) -> bool {
        self.link_count.is_some_and(|n| n > 0)
    }
}
