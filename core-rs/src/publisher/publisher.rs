/**
 * publisher.rs
 * Ontology Publisher - gets ontology graphs into a triplestore and proves they landed
 *
 * Workflow per artifact (single linear sequence, no internal retries):
 * 1. validate  - dataset name, file exists, file non-empty (no network)
 * 2. upload    - graph store protocol POST, 200/201 accepted
 * 3. verify    - triple count scoped to the graph, must be >= 1
 * 4. diagnose  - class / object-property counts, best-effort
 *
 * `ensure_dataset` is the only operation that waits: it polls the health
 * endpoint with a deadline before issuing the create call. Clearing a graph
 * is never part of `publish`; callers invoke `clear_graph` explicitly.
 */

use chrono::Utc;
use tracing::{debug, info, warn};

use super::readiness::wait_until_ready;
use super::report::{
    ArtifactOutcome, BatchMode, BatchReport, DatasetStats, InheritanceCheck, NamespaceCheck, PublishResult,
};
use crate::config::PublisherConfig;
use crate::dataset::{parse_dataset_listing, validate_dataset_name, DatasetInfo, DatasetState, StorageKind};
use crate::drivers::{HttpReply, HttpTransport, TriplestoreTransport};
use crate::errors::{PublishError, Result};
use crate::ontology::{parse_count, GraphTarget, OntologyArtifact, SparqlQuery, SparqlUpdate};

/// Orchestrates dataset creation, graph uploads and post-load verification
pub struct OntologyPublisher<T: TriplestoreTransport> {
    transport: T,
    config: PublisherConfig,
}

impl OntologyPublisher<HttpTransport> {
    /// Create a publisher talking HTTP to `config.base_url`
    ///
    /// # Example
    /// ```
    /// use ontopub_core::config::PublisherConfig;
    /// use ontopub_core::publisher::OntologyPublisher;
    ///
    /// let publisher = OntologyPublisher::connect(PublisherConfig::default()).unwrap();
    /// assert_eq!(publisher.config().dataset, "ontologies");
    /// ```
    pub fn connect(config: PublisherConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: TriplestoreTransport> OntologyPublisher<T> {
    pub fn new(transport: T, config: PublisherConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Poll the health endpoint until it answers 2xx or the readiness timeout elapses
    pub async fn wait_until_ready(&self) -> Result<u32> {
        wait_until_ready(
            &self.transport,
            &self.config.base_url,
            self.config.readiness_timeout,
            self.config.poll_interval,
        )
        .await
    }

    /// Make sure `name` exists, creating it if needed
    ///
    /// An "already exists" answer is success. Waits for readiness first and
    /// fails with `InfrastructureUnreachable` if the triplestore never comes up.
    pub async fn ensure_dataset(&self, name: &str, storage: StorageKind) -> Result<DatasetState> {
        validate_dataset_name(name)?;
        self.wait_until_ready().await?;

        info!(dataset = %name, storage = %storage, "ensuring dataset exists");
        let reply = self
            .transport
            .create_dataset(name, storage)
            .await
            .map_err(|e| PublishError::InfrastructureUnreachable {
                base_url: self.config.base_url.clone(),
                waited: self.config.request_timeout,
                detail: format!("dataset creation request failed: {}", e),
            })?;

        if reply.is_success() {
            info!(dataset = %name, status = reply.status, "dataset created");
            Ok(DatasetState::Created)
        } else if is_duplicate_dataset(&reply) {
            info!(dataset = %name, status = reply.status, "dataset already exists");
            Ok(DatasetState::AlreadyExisted)
        } else {
            Err(PublishError::DatasetCreationFailed {
                dataset: name.to_string(),
                status: reply.status,
                body: reply.body,
            })
        }
    }

    /// Remove every triple from `graph` (irreversible)
    pub async fn clear_graph(&self, dataset: &str, graph: &GraphTarget) -> Result<()> {
        validate_dataset_name(dataset)?;
        let update = SparqlUpdate::clear(graph);
        warn!(dataset = %dataset, graph = %graph, "clearing graph");

        let reply = self
            .transport
            .update(dataset, &update)
            .await
            .map_err(|e| PublishError::ClearRejected {
                dataset: dataset.to_string(),
                graph: graph.to_string(),
                status: None,
                body: e.to_string(),
            })?;

        if !reply.is_success() {
            return Err(PublishError::ClearRejected {
                dataset: dataset.to_string(),
                graph: graph.to_string(),
                status: Some(reply.status),
                body: reply.body,
            });
        }
        Ok(())
    }

    /// Upload one artifact and verify that it produced triples
    pub async fn publish(&self, dataset: &str, artifact: &OntologyArtifact) -> Result<PublishResult> {
        let graph = artifact.graph();

        // validate
        validate_dataset_name(dataset)?;
        let payload = artifact.load_payload().await?;
        debug!(
            artifact = %artifact.path().display(),
            bytes = payload.len(),
            content_type = %artifact.content_type(),
            "artifact validated"
        );

        // upload
        info!(dataset = %dataset, graph = %graph, artifact = %artifact.label(), "uploading artifact");
        let reply = self
            .transport
            .upload(dataset, graph, artifact.content_type(), payload)
            .await
            .map_err(|e| PublishError::UploadRejected {
                dataset: dataset.to_string(),
                graph: graph.to_string(),
                status: None,
                body: e.to_string(),
            })?;

        if !matches!(reply.status, 200 | 201) {
            return Err(PublishError::UploadRejected {
                dataset: dataset.to_string(),
                graph: graph.to_string(),
                status: Some(reply.status),
                body: reply.body,
            });
        }

        // verify
        let triple_count = self
            .count(dataset, &SparqlQuery::triple_count(graph))
            .await
            .map_err(|reason| PublishError::VerificationQueryFailed {
                dataset: dataset.to_string(),
                graph: graph.to_string(),
                reason,
            })?;

        if triple_count == 0 {
            return Err(PublishError::EmptyLoadDetected {
                dataset: dataset.to_string(),
                graph: graph.to_string(),
            });
        }

        // diagnose
        let class_count = self
            .diagnostic_count(dataset, graph, "class", &SparqlQuery::class_count(graph))
            .await;
        let object_property_count = self
            .diagnostic_count(dataset, graph, "object property", &SparqlQuery::object_property_count(graph))
            .await;

        info!(
            dataset = %dataset,
            graph = %graph,
            status = reply.status,
            triples = triple_count,
            classes = ?class_count,
            object_properties = ?object_property_count,
            "artifact published"
        );

        Ok(PublishResult {
            dataset: dataset.to_string(),
            graph: graph.iri().map(str::to_string),
            status: reply.status,
            triple_count,
            class_count,
            object_property_count,
            published_at: Utc::now(),
        })
    }

    /// Publish artifacts strictly in order, stopping at the first failure
    pub async fn publish_all(&self, dataset: &str, artifacts: &[OntologyArtifact]) -> BatchReport {
        self.publish_all_with_mode(dataset, artifacts, BatchMode::FailFast).await
    }

    /// Publish artifacts strictly in order under an explicit batch mode
    ///
    /// Nothing already uploaded is rolled back when a later artifact fails.
    pub async fn publish_all_with_mode(
        &self,
        dataset: &str,
        artifacts: &[OntologyArtifact],
        mode: BatchMode,
    ) -> BatchReport {
        let mut report = BatchReport::new(dataset, mode, artifacts.len());

        for (index, artifact) in artifacts.iter().enumerate() {
            let result = self.publish(dataset, artifact).await;
            let failed = result.is_err();

            if let Err(err) = &result {
                warn!(
                    position = index + 1,
                    artifact = %artifact.label(),
                    kind = err.kind(),
                    error = %err,
                    "artifact failed"
                );
            }

            report.outcomes.push(ArtifactOutcome {
                artifact: artifact.clone(),
                result,
            });

            if failed && mode == BatchMode::FailFast {
                let skipped = artifacts.len() - index - 1;
                if skipped > 0 {
                    warn!(skipped, "stopping batch after failure");
                }
                break;
            }
        }

        report
    }

    /// Names and state of every dataset on the server
    pub async fn list_datasets(&self) -> Result<Vec<DatasetInfo>> {
        let reply = self.transport.list_datasets().await?;
        if !reply.is_success() {
            return Err(PublishError::QueryFailed {
                dataset: "$/datasets".to_string(),
                reason: format!("status {}: {}", reply.status, reply.body),
            });
        }
        parse_dataset_listing(&reply.body)
    }

    /// Triple, subject and predicate totals across the dataset (best-effort)
    pub async fn dataset_stats(&self, dataset: &str) -> Result<DatasetStats> {
        validate_dataset_name(dataset)?;

        let mut stats = DatasetStats {
            dataset: dataset.to_string(),
            ..DatasetStats::default()
        };
        stats.total_triples = self
            .best_effort(dataset, "total triples", &SparqlQuery::dataset_triple_count())
            .await;
        stats.unique_subjects = self
            .best_effort(dataset, "unique subjects", &SparqlQuery::dataset_subject_count())
            .await;
        stats.unique_predicates = self
            .best_effort(dataset, "unique predicates", &SparqlQuery::dataset_predicate_count())
            .await;

        Ok(stats)
    }

    /// Count `owl:Class` terms per `(label, namespace)` pair
    pub async fn check_namespaces(
        &self,
        dataset: &str,
        namespaces: &[(String, String)],
    ) -> Result<Vec<NamespaceCheck>> {
        validate_dataset_name(dataset)?;

        let mut checks = Vec::with_capacity(namespaces.len());
        for (label, namespace) in namespaces {
            let class_count = self
                .best_effort(dataset, label, &SparqlQuery::namespace_class_count(namespace))
                .await;
            checks.push(NamespaceCheck {
                label: label.clone(),
                namespace: namespace.clone(),
                class_count,
            });
        }
        Ok(checks)
    }

    /// Count subclass links from `sub_namespace` into `super_namespace`
    ///
    /// Confirms that an ontology published later actually builds on one
    /// published before it.
    pub async fn check_inheritance(
        &self,
        dataset: &str,
        sub_namespace: &str,
        super_namespace: &str,
    ) -> Result<InheritanceCheck> {
        validate_dataset_name(dataset)?;
        if sub_namespace.is_empty() || super_namespace.is_empty() {
            return Err(PublishError::InvalidInput(
                "Inheritance check needs both a sub-class and a super-class namespace".to_string(),
            ));
        }

        let link_count = self
            .best_effort(
                dataset,
                "subclass link",
                &SparqlQuery::inheritance_count(sub_namespace, super_namespace),
            )
            .await;
        info!(
            dataset = %dataset,
            sub = %sub_namespace,
            super_ns = %super_namespace,
            links = ?link_count,
            "inheritance checked"
        );

        Ok(InheritanceCheck {
            sub_namespace: sub_namespace.to_string(),
            super_namespace: super_namespace.to_string(),
            link_count,
        })
    }

    /// Run a count query; the error is a human-readable reason
    async fn count(&self, dataset: &str, query: &SparqlQuery) -> std::result::Result<u64, String> {
        let reply: HttpReply = self
            .transport
            .query(dataset, query)
            .await
            .map_err(|e| e.to_string())?;

        if !reply.is_success() {
            return Err(format!("query answered status {}: {}", reply.status, reply.body));
        }
        parse_count(&reply.body).map_err(|e| e.to_string())
    }

    async fn diagnostic_count(
        &self,
        dataset: &str,
        graph: &GraphTarget,
        what: &str,
        query: &SparqlQuery,
    ) -> Option<u64> {
        match self.count(dataset, query).await {
            Ok(n) => Some(n),
            Err(reason) => {
                warn!(dataset = %dataset, graph = %graph, reason = %reason, "{} count unavailable", what);
                None
            }
        }
    }

    async fn best_effort(&self, dataset: &str, what: &str, query: &SparqlQuery) -> Option<u64> {
        match self.count(dataset, query).await {
            Ok(n) => Some(n),
            Err(reason) => {
                warn!(dataset = %dataset, reason = %reason, "{} count unavailable", what);
                None
            }
        }
    }
}

/// 409 Conflict, or an error body saying the name is taken
fn is_duplicate_dataset(reply: &HttpReply) -> bool {
    if reply.status == 409 {
        return true;
    }
    let body = reply.body.to_ascii_lowercase();
    (400..500).contains(&reply.status)
        && (body.contains("already exists") || body.contains("already registered"))
}
