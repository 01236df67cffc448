/**
 * manifest.rs
 * Parser for publish manifests (YAML format)
 *
 * Format:
 * ```yaml
 * apiVersion: ontopub/v1
 * kind: PublishManifest
 * metadata:
 *   name: gist-dbc-sow
 * spec:
 *   dataset: ontologies
 *   storage: persistent
 *   continueOnError: false
 *   artifacts:
 *     - path: gist/gistCore.ttl
 *       graph: https://w3id.org/semanticarts/ontology/gistCore
 *     - path: bridge/gist_dbc_bridge.owl
 *       graph: https://agentic-data-scraper.com/ontology/gist-dbc-bridge
 *       contentType: rdf-xml
 * ```
 *
 * Artifact order is publish order. Relative paths resolve against the
 * directory holding the manifest.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::{validate_dataset_name, StorageKind};
use crate::errors::{PublishError, Result};
use crate::ontology::{ContentType, GraphTarget, OntologyArtifact};

pub const MANIFEST_API_VERSION: &str = "ontopub/v1";
pub const MANIFEST_KIND: &str = "PublishManifest";

/// Publish manifest file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishManifest {
    pub api_version: String,
    pub kind: String,
    pub metadata: ManifestMetadata,
    pub spec: ManifestSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestMetadata {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSpec {
    /// Overrides the configured dataset when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub continue_on_error: bool,
    pub artifacts: Vec<ManifestArtifact>,
}

/// One artifact entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManifestArtifact {
    pub path: PathBuf,
    /// Named graph IRI; omitted means the default graph
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<String>,
    /// Inferred from the file extension when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
}

impl PublishManifest {
    /// Load a manifest from the specified path
    ///
    /// Relative artifact paths are rebased onto the manifest's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PublishError::Config(format!(
                "Manifest not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let mut manifest: PublishManifest = serde_yaml::from_str(&content)?;
        manifest.validate()?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for artifact in &mut manifest.spec.artifacts {
            if artifact.path.is_relative() {
                artifact.path = base.join(&artifact.path);
            }
        }

        Ok(manifest)
    }

    /// Validate manifest structure
    ///
    /// Ensures:
    /// - apiVersion is "ontopub/v1"
    /// - kind is "PublishManifest"
    /// - metadata.name is non-empty
    /// - spec.dataset, when given, is a valid dataset name
    /// - at least one artifact, each with a path and a valid graph IRI
    pub fn validate(&self) -> Result<()> {
        if self.api_version != MANIFEST_API_VERSION {
            return Err(PublishError::Config(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                MANIFEST_API_VERSION, self.api_version
            )));
        }

        if self.kind != MANIFEST_KIND {
            return Err(PublishError::Config(format!(
                "Invalid kind: expected '{}', got '{}'",
                MANIFEST_KIND, self.kind
            )));
        }

        if self.metadata.name.is_empty() {
            return Err(PublishError::Config("metadata.name cannot be empty".to_string()));
        }

        if let Some(dataset) = &self.spec.dataset {
            validate_dataset_name(dataset).map_err(|e| PublishError::Config(e.to_string()))?;
        }

        if self.spec.artifacts.is_empty() {
            return Err(PublishError::Config("spec.artifacts cannot be empty".to_string()));
        }

        for (index, artifact) in self.spec.artifacts.iter().enumerate() {
            if artifact.path.as_os_str().is_empty() {
                return Err(PublishError::Config(format!(
                    "spec.artifacts[{}].path cannot be empty",
                    index
                )));
            }
            if let Some(graph) = &artifact.graph {
                GraphTarget::named(graph.as_str()).map_err(|e| {
                    PublishError::Config(format!("spec.artifacts[{}].graph: {}", index, e))
                })?;
            }
        }

        Ok(())
    }

    /// Artifacts in publish order
    pub fn artifacts(&self) -> Result<Vec<OntologyArtifact>> {
        self.spec
            .artifacts
            .iter()
            .map(|entry| {
                let graph = match &entry.graph {
                    Some(iri) => GraphTarget::named(iri.as_str())?,
                    None => GraphTarget::Default,
                };
                let content_type = entry
                    .content_type
                    .unwrap_or_else(|| ContentType::from_path(&entry.path));
                Ok(OntologyArtifact::new(entry.path.clone(), graph, content_type))
            })
            .collect()
    }
}
